//! Tests for the domain arena: initialization, restriction, the removal trail and snapshots

#[cfg(test)]
mod tests {
    use wavetile::algorithm::bitset::Domain;
    use wavetile::io::error::DefinitionError;
    use wavetile::spatial::grid::Grid;
    use wavetile::{CandidateId, DirectionSet, GraphShape, GridShape, TileSet};

    fn tileset(count: usize) -> TileSet {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        for index in 0..count {
            builder.add_candidate_default(format!("c{index}"));
        }
        builder.build().expect("Failed to build tileset")
    }

    // Tests every cell starts with the full candidate set
    // Verified by initializing domains empty
    #[test]
    fn test_initialize_full_domains() {
        let grid = Grid::initialize(GridShape::rect(3, 2), &tileset(4)).expect("Failed to build grid");
        assert_eq!(grid.cell_count(), 6);
        assert_eq!(grid.candidate_count(), 4);
        for cell in 0..6 {
            assert_eq!(grid.domain(cell), Domain::full(4));
        }
        assert_eq!(grid.remaining_candidates(), 24);
        assert!(!grid.is_solved());
    }

    // Tests the shape and tileset must agree on directions
    // Verified by skipping the direction set check
    #[test]
    fn test_direction_mismatch() {
        let result = Grid::initialize(GridShape::cuboid(2, 2, 2), &tileset(2));
        assert_eq!(
            result.err(),
            Some(DefinitionError::DirectionMismatch {
                tileset: DirectionSet::cartesian_2d().to_string(),
                shape: DirectionSet::cartesian_3d().to_string(),
            })
        );
    }

    // Tests direction sets of equal size but different opposites are refused
    // Verified by comparing only the number of directions
    #[test]
    fn test_direction_mismatch_same_count() {
        let compass = DirectionSet::custom(
            vec!["n".into(), "s".into(), "e".into(), "w".into()],
            vec![1, 0, 3, 2],
        )
        .expect("Valid custom directions");
        assert_eq!(compass.len(), DirectionSet::cartesian_2d().len());

        let north = compass.find("n").expect("n exists");
        let mut graph = GraphShape::new(compass, 2);
        graph.connect_both(0, north, 1);

        let result = Grid::initialize(GridShape::Graph(graph), &tileset(2));
        assert!(matches!(
            result,
            Err(DefinitionError::DirectionMismatch { ref tileset, ref shape })
                if tileset.contains("+x|-x") && shape.contains("n|s")
        ));
    }

    // Tests restriction narrows a domain and reports change
    // Verified by always returning true from restrict
    #[test]
    fn test_restrict() {
        let mut grid = Grid::initialize(GridShape::rect(2, 1), &tileset(3)).expect("Failed to build grid");
        let mut narrowed = Domain::full(3);
        narrowed.remove(CandidateId::new(1));

        assert_eq!(grid.restrict(0, &narrowed), Ok(true));
        assert_eq!(grid.domain_size(0), 2);
        assert!(!grid.contains(0, CandidateId::new(1)));
        assert_eq!(grid.restrict(0, &narrowed), Ok(false));
    }

    // Tests restriction may never add candidates
    // Verified by removing the subset check
    #[test]
    fn test_restrict_rejects_growth() {
        let mut grid = Grid::initialize(GridShape::rect(2, 1), &tileset(3)).expect("Failed to build grid");
        grid.restrict(1, &Domain::single(3, CandidateId::new(0)))
            .expect("Restriction should be accepted");

        let violation = grid
            .restrict(1, &Domain::single(3, CandidateId::new(2)))
            .expect_err("Growth must be rejected");
        assert_eq!(violation.operation, "restrict");
        assert_eq!(violation.cell, 1);
        assert_eq!(grid.domain(1), Domain::single(3, CandidateId::new(0)));

        assert!(grid.restrict(9, &Domain::empty(3)).is_err());
        assert!(grid.restrict(0, &Domain::empty(5)).is_err());
    }

    // Tests remove reports whether the candidate was present
    // Verified by ignoring the presence check
    #[test]
    fn test_remove() {
        let mut grid = Grid::initialize(GridShape::rect(1, 1), &tileset(2)).expect("Failed to build grid");
        assert_eq!(grid.remove(0, CandidateId::new(1)), Ok(true));
        assert_eq!(grid.remove(0, CandidateId::new(1)), Ok(false));
        assert!(grid.is_solved());
    }

    // Tests restore brings back exactly the captured domains
    // Verified by restoring sizes without the bits
    #[test]
    fn test_snapshot_restore() {
        let mut grid = Grid::initialize(GridShape::rect(3, 3), &tileset(3)).expect("Failed to build grid");
        grid.remove(4, CandidateId::new(2)).expect("Removal should be accepted");
        let snapshot = grid.snapshot();
        assert_eq!(snapshot.remaining_candidates(), 26);

        grid.restrict(0, &Domain::empty(3)).expect("Restriction should be accepted");
        grid.remove(4, CandidateId::new(0)).expect("Removal should be accepted");
        assert_eq!(grid.first_contradiction(), Some(0));

        grid.restore(&snapshot).expect("Snapshot fits the grid");
        assert!(grid.matches(&snapshot));
        assert_eq!(grid.first_contradiction(), None);
        assert_eq!(grid.domain_size(4), 2);
        assert_eq!(grid.domain_size(0), 3);
    }

    // Tests rollback re-inserts exactly the removals made after a checkpoint
    // Verified by restoring only the most recent removal
    #[test]
    fn test_checkpoint_rollback() {
        let mut grid = Grid::initialize(GridShape::rect(3, 1), &tileset(3)).expect("Failed to build grid");
        grid.remove(0, CandidateId::new(0)).expect("Removal should be accepted");
        let outer = grid.checkpoint();
        let before = grid.snapshot();

        grid.restrict(1, &Domain::single(3, CandidateId::new(2)))
            .expect("Restriction should be accepted");
        let inner = grid.checkpoint();
        let middle = grid.snapshot();
        grid.restrict(2, &Domain::empty(3)).expect("Restriction should be accepted");
        grid.remove(0, CandidateId::new(1)).expect("Removal should be accepted");
        assert_eq!(grid.trail_len(), 1 + 2 + 3 + 1);

        grid.rollback(inner).expect("Checkpoint is on the trail");
        assert!(grid.matches(&middle));
        assert_eq!(grid.domain_size(2), 3);
        assert_eq!(grid.first_contradiction(), None);

        grid.rollback(outer).expect("Checkpoint is on the trail");
        assert!(grid.matches(&before));
        assert_eq!(grid.domain_sizes(), &[2, 3, 3]);
        assert_eq!(grid.trail_len(), 1);
    }

    // Tests committed removals cannot be rolled back and stale marks are refused
    // Verified by keeping the trail on commit
    #[test]
    fn test_commit_and_stale_mark() {
        let mut grid = Grid::initialize(GridShape::rect(2, 1), &tileset(2)).expect("Failed to build grid");
        grid.remove(1, CandidateId::new(1)).expect("Removal should be accepted");
        let mark = grid.checkpoint();
        grid.remove(0, CandidateId::new(0)).expect("Removal should be accepted");
        grid.commit();
        assert_eq!(grid.trail_len(), 0);

        let violation = grid.rollback(mark).expect_err("Mark is past the trail");
        assert_eq!(violation.operation, "rollback");
        grid.rollback(0).expect("Empty rollback is fine");
        assert_eq!(grid.domain_sizes(), &[1, 1]);
    }

    // Tests the trail stays within one entry per removable candidate
    // Verified by recording the whole domain on every restriction
    #[test]
    fn test_trail_bounded_by_domains() {
        let mut grid = Grid::initialize(GridShape::rect(4, 4), &tileset(4)).expect("Failed to build grid");
        let mut marks = Vec::new();
        for cell in 0..16 {
            marks.push(grid.checkpoint());
            for candidate in 1..4 {
                grid.remove(cell, CandidateId::new(candidate))
                    .expect("Removal should be accepted");
            }
        }
        assert_eq!(marks.len(), 16);
        assert_eq!(grid.trail_len(), 16 * 3);
        assert!(grid.is_solved());

        grid.rollback(marks.first().copied().unwrap_or_default())
            .expect("Checkpoint is on the trail");
        assert_eq!(grid.remaining_candidates(), 64);
    }

    // Tests snapshots from a different grid are refused
    // Verified by copying without the size check
    #[test]
    fn test_restore_mismatched_snapshot() {
        let small = Grid::initialize(GridShape::rect(2, 2), &tileset(2)).expect("Failed to build grid");
        let mut large = Grid::initialize(GridShape::rect(3, 3), &tileset(2)).expect("Failed to build grid");
        assert!(large.restore(&small.snapshot()).is_err());
    }

    // Tests out-of-range reads are empty rather than panicking
    // Verified by indexing the arena directly
    #[test]
    fn test_out_of_range_reads() {
        let grid = Grid::initialize(GridShape::rect(2, 2), &tileset(2)).expect("Failed to build grid");
        assert!(grid.domain(10).is_empty());
        assert_eq!(grid.domain_size(10), 0);
        assert!(!grid.contains(10, CandidateId::new(0)));
        assert!(!grid.contains(0, CandidateId::new(5)));
        assert!(grid.neighbors(10).is_empty());
    }

    #[test]
    fn test_with_candidates_requires_candidates() {
        assert_eq!(
            Grid::with_candidates(GridShape::rect(2, 2), 0).err().map(|e| e.to_string()),
            Some(DefinitionError::EmptyTileSet.to_string())
        );
    }
}
