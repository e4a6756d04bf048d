#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::fs;
    use std::io;
    use std::path::Path;

    const SRC: &str = "src";
    const UNIT: &str = "tests/unit";

    /// Entry points and module files carry no behaviour of their own
    fn is_organizational(relative: &str) -> bool {
        let file_name = Path::new(relative)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        matches!(file_name, "main.rs" | "lib.rs" | "mod.rs")
    }

    fn relative_paths(base: &Path) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();
        collect(base, base, &mut paths).expect("Failed to scan directory");
        paths
    }

    fn collect(dir: &Path, base: &Path, paths: &mut BTreeSet<String>) -> io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let relative = path
                .strip_prefix(base)
                .map_err(io::Error::other)?
                .to_string_lossy()
                .replace('\\', "/");

            if path.is_dir() {
                paths.insert(relative);
                collect(&path, base, paths)?;
            } else if path.extension().and_then(|ext| ext.to_str()) == Some("rs") {
                paths.insert(relative);
            }
        }
        Ok(())
    }

    // Tests every source file has a unit test file at the mirrored path
    // Verified by deleting tests/unit/io/rules.rs
    #[test]
    fn test_all_src_files_have_unit_tests() {
        let tests = relative_paths(Path::new(UNIT));
        let missing: Vec<String> = relative_paths(Path::new(SRC))
            .into_iter()
            .filter(|path| !is_organizational(path) && !tests.contains(path))
            .map(|path| format!("  - src/{path} -> tests/unit/{path}"))
            .collect();

        assert!(
            missing.is_empty(),
            "Source files without unit tests:\n{}",
            missing.join("\n")
        );
    }

    // Tests no unit test file outlives its source file
    // Verified by adding tests/unit/io/image.rs
    #[test]
    fn test_all_unit_tests_have_src_counterparts() {
        let sources = relative_paths(Path::new(SRC));
        let orphaned: Vec<String> = relative_paths(Path::new(UNIT))
            .into_iter()
            .filter(|path| !is_organizational(path) && !sources.contains(path))
            .map(|path| format!("  - tests/unit/{path} -> src/{path} (missing)"))
            .collect();

        assert!(
            orphaned.is_empty(),
            "Unit test files without a source file:\n{}",
            orphaned.join("\n")
        );
    }

    // Tests every test file actually declares tests
    // Verified by emptying tests/unit/math/entropy.rs
    #[test]
    fn test_all_test_files_contain_tests() {
        let tests_dir = Path::new("tests");
        let empty: Vec<String> = relative_paths(tests_dir)
            .into_iter()
            .filter(|path| path.ends_with(".rs") && !is_organizational(path))
            .filter(|path| {
                fs::read_to_string(tests_dir.join(path))
                    .map(|content| !content.contains("#[test]"))
                    .unwrap_or(true)
            })
            .map(|path| format!("  - tests/{path}"))
            .collect();

        assert!(
            empty.is_empty(),
            "Test files without #[test] functions:\n{}",
            empty.join("\n")
        );
    }
}
