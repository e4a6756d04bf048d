//! Tests for tileset construction, validation and compatibility lookups

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use wavetile::algorithm::bitset::Domain;
    use wavetile::io::error::DefinitionError;
    use wavetile::{CandidateId, Direction, DirectionSet, Rotation, TileSet};

    fn road_tileset() -> TileSet {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        builder.add_candidate("grass", 3.0);
        builder.add_candidate_default("road");
        builder.add_candidate_default("water");
        builder
            .allow("grass", "+x", "road")
            .allow("road", "+x", "road")
            .allow("grass", "+y", "water");
        builder.build().expect("Failed to build road tileset")
    }

    // Tests candidates receive dense ids in definition order
    // Verified by assigning ids in reverse order
    #[test]
    fn test_candidate_ids() {
        let tileset = road_tileset();
        assert_eq!(tileset.len(), 3);
        assert_eq!(tileset.find("road"), Some(CandidateId::new(1)));
        assert_eq!(tileset.find("lava"), None);
        assert_eq!(
            tileset.candidate(CandidateId::new(2)).map(|c| c.name.as_str()),
            Some("water")
        );
        assert!((tileset.weight(CandidateId::new(0)) - 3.0).abs() < f64::EPSILON);
        assert!((tileset.weight(CandidateId::new(1)) - 1.0).abs() < f64::EPSILON);
    }

    // Tests a rule also allows the reverse adjacency
    // Verified by skipping the reverse insertion in build
    #[test]
    fn test_rule_symmetry() {
        let tileset = road_tileset();
        let grass = CandidateId::new(0);
        let road = CandidateId::new(1);
        let water = CandidateId::new(2);

        assert!(tileset.is_compatible(grass, road, Direction::POS_X));
        assert!(tileset.is_compatible(road, grass, Direction::NEG_X));
        assert!(tileset.is_compatible(water, grass, Direction::NEG_Y));
        // Absence of a rule means disallowed, nothing is inferred
        assert!(!tileset.is_compatible(road, grass, Direction::POS_X));
        assert!(!tileset.is_compatible(grass, water, Direction::POS_X));
    }

    // Tests compatibility checks are total over bad inputs
    // Verified by indexing without bounds checks
    #[test]
    fn test_is_compatible_out_of_range() {
        let tileset = road_tileset();
        assert!(!tileset.is_compatible(CandidateId::new(9), CandidateId::new(0), Direction::POS_X));
        assert!(!tileset.is_compatible(CandidateId::new(0), CandidateId::new(9), Direction::POS_X));
        assert!(!tileset.is_compatible(CandidateId::new(0), CandidateId::new(1), Direction::POS_Z));
    }

    // Tests support of a domain is the union of compatible rows
    // Verified by intersecting rows instead of unioning them
    #[test]
    fn test_supported() {
        let tileset = road_tileset();
        let mut domain = Domain::empty(3);
        domain.insert(CandidateId::new(0));
        domain.insert(CandidateId::new(1));

        let support = tileset.supported(&domain, Direction::POS_X);
        assert_eq!(support.to_vec(), vec![CandidateId::new(1)]);

        let support = tileset.supported(&domain, Direction::NEG_X);
        assert_eq!(support.to_vec(), vec![CandidateId::new(0), CandidateId::new(1)]);

        assert!(tileset.supported(&Domain::empty(3), Direction::POS_X).is_empty());
    }

    // Tests each validation failure of build
    // Verified by removing the duplicate name check
    #[test]
    fn test_build_validation() {
        let empty = TileSet::builder(DirectionSet::cartesian_2d()).build();
        assert_eq!(empty.err(), Some(DefinitionError::EmptyTileSet));

        let mut duplicate = TileSet::builder(DirectionSet::cartesian_2d());
        duplicate.add_candidate_default("a");
        duplicate.add_candidate_default("a");
        assert_eq!(
            duplicate.build().err(),
            Some(DefinitionError::DuplicateCandidate {
                name: "a".to_string()
            })
        );

        let mut undefined = TileSet::builder(DirectionSet::cartesian_2d());
        undefined.add_candidate_default("a");
        undefined.allow("a", "+x", "b");
        assert_eq!(
            undefined.build().err(),
            Some(DefinitionError::UndefinedCandidate {
                name: "b".to_string()
            })
        );

        let mut direction = TileSet::builder(DirectionSet::cartesian_2d());
        direction.add_candidate_default("a");
        direction.allow("a", "+z", "a");
        assert_eq!(
            direction.build().err(),
            Some(DefinitionError::UnknownDirection {
                name: "+z".to_string()
            })
        );
    }

    // Tests non-positive and non-finite weights are rejected
    // Verified by accepting zero weights
    #[test]
    fn test_invalid_weights() {
        for weight in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
            builder.add_candidate("a", weight);
            assert!(matches!(
                builder.build(),
                Err(DefinitionError::InvalidWeight { .. })
            ));
        }
    }

    // Tests id based rules resolve like named ones
    // Verified by dropping id rules during build
    #[test]
    fn test_allow_ids() {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        let a = builder.add_candidate_default("a");
        let b = builder.add_candidate_default("b");
        builder.allow_ids(a, Direction::POS_Y, b);
        let tileset = builder.build().expect("Failed to build tileset");
        assert!(tileset.is_compatible(a, b, Direction::POS_Y));
        assert!(tileset.is_compatible(b, a, Direction::NEG_Y));

        let mut bad = TileSet::builder(DirectionSet::cartesian_2d());
        let a = bad.add_candidate_default("a");
        bad.allow_ids(a, Direction::POS_X, CandidateId::new(4));
        assert!(matches!(
            bad.build(),
            Err(DefinitionError::UndefinedCandidate { .. })
        ));
    }

    // Tests boundary prohibitions remove the candidate for that edge only
    // Verified by removing the candidate from every direction
    #[test]
    fn test_boundary_allowed() {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        builder.add_candidate_default("a");
        builder.add_candidate_default("b");
        builder.prohibit_boundary("b", "-y");
        let tileset = builder.build().expect("Failed to build tileset");

        assert!(tileset.has_boundary_rules());
        assert_eq!(tileset.boundary_allowed(Direction::NEG_Y).to_vec(), vec![CandidateId::new(0)]);
        assert_eq!(tileset.boundary_allowed(Direction::POS_Y).count(), 2);
        assert!(!road_tileset().has_boundary_rules());
    }

    // Tests weight overrides replace named weights and keep the rules
    // Verified by rebuilding compatibility without the original rules
    #[test]
    fn test_with_weights() {
        let tileset = road_tileset();
        let overrides = BTreeMap::from([("water".to_string(), 0.5)]);
        let reweighted = tileset.with_weights(&overrides).expect("Valid overrides");

        assert!((reweighted.weight(CandidateId::new(2)) - 0.5).abs() < f64::EPSILON);
        assert!((reweighted.weight_log_weight(CandidateId::new(2)) - 0.5 * 0.5_f64.ln()).abs() < 1e-12);
        assert!(reweighted.is_compatible(CandidateId::new(0), CandidateId::new(1), Direction::POS_X));

        let unknown = BTreeMap::from([("lava".to_string(), 1.0)]);
        assert_eq!(
            tileset.with_weights(&unknown).err(),
            Some(DefinitionError::UndefinedCandidate {
                name: "lava".to_string()
            })
        );
    }

    // Tests a rotatable candidate brings four named variants with turned rules
    // Verified by copying the rule unturned to every variant
    #[test]
    fn test_rotated_variants() {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        let bend = builder.add_rotatable("bend", 2.0);
        builder.add_candidate_default("open");
        builder.allow("bend", "+x", "open");
        let tileset = builder.build().expect("Failed to build tileset");

        assert_eq!(tileset.len(), 5);
        let names: Vec<&str> = tileset.candidates().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["bend", "bend@90", "bend@180", "bend@270", "open"]);
        assert!((tileset.weight(CandidateId::new(3)) - 2.0).abs() < f64::EPSILON);

        let open = tileset.find("open").expect("open is defined");
        let turned = [
            Direction::POS_X,
            Direction::POS_Y,
            Direction::NEG_X,
            Direction::NEG_Y,
        ];
        for (turns, direction) in turned.into_iter().enumerate() {
            let variant = CandidateId::new(bend.index() + turns);
            assert!(tileset.is_compatible(variant, open, direction));
            assert_eq!(tileset.base(variant), bend);
            assert_eq!(tileset.rotation(variant), Rotation::quarter_turns(turns));
        }
        assert!(!tileset.is_compatible(bend, open, Direction::POS_Y));
        assert_eq!(tileset.rotation(open), Rotation::IDENTITY);
        assert_eq!(tileset.base(open), open);
    }

    // Tests rules between two rotatable candidates turn both ends and the direction
    // Verified by turning only the first candidate
    #[test]
    fn test_rotated_pairs_and_boundary() {
        let mut builder = TileSet::builder(DirectionSet::cartesian_3d());
        let pipe = builder.add_rotatable("pipe", 1.0);
        builder.allow("pipe", "+x", "pipe@180");
        builder.prohibit_boundary("pipe", "+z");
        builder.prohibit_boundary("pipe@90", "-x");
        let tileset = builder.build().expect("Failed to build tileset");

        let variant = |turns: usize| CandidateId::new(pipe.index() + turns);
        assert!(tileset.is_compatible(variant(0), variant(2), Direction::POS_X));
        assert!(tileset.is_compatible(variant(1), variant(3), Direction::POS_Y));
        assert!(tileset.is_compatible(variant(2), variant(0), Direction::NEG_X));
        assert!(!tileset.is_compatible(variant(1), variant(3), Direction::POS_X));

        assert_eq!(tileset.boundary_allowed(Direction::POS_Z).count(), 0);
        // pipe@90 on the -x edge turns into pipe@180 on -y, pipe@270 on +x and pipe on +y
        assert!(!tileset.boundary_allowed(Direction::NEG_X).contains(variant(1)));
        assert!(!tileset.boundary_allowed(Direction::POS_Y).contains(variant(0)));
        assert!(!tileset.boundary_allowed(Direction::POS_X).contains(variant(3)));
        assert!(tileset.boundary_allowed(Direction::POS_X).contains(variant(1)));
    }

    // Tests rotations are refused over custom direction sets
    // Verified by building custom sets with unturned rules
    #[test]
    fn test_rotation_needs_cartesian() {
        let ring = DirectionSet::custom(vec!["next".into(), "prev".into()], vec![1, 0])
            .expect("Valid custom directions");
        let mut builder = TileSet::builder(ring);
        builder.add_rotatable("arrow", 1.0);
        assert_eq!(
            builder.build().err(),
            Some(DefinitionError::RotationUnsupported {
                candidate: "arrow".to_string()
            })
        );
    }

    // Tests count limits resolve names into a group and reject empty caps
    // Verified by accepting a maximum of zero
    #[test]
    fn test_count_limits() {
        let mut builder = TileSet::builder(DirectionSet::cartesian_2d());
        builder.add_candidate_default("a");
        builder.add_candidate_default("b");
        builder.add_candidate_default("c");
        builder.limit_count(["a", "c"], 3);
        let tileset = builder.build().expect("Failed to build tileset");

        let limits = tileset.count_limits();
        assert_eq!(limits.len(), 1);
        assert_eq!(
            limits.first().map(|limit| (limit.group.to_vec(), limit.max)),
            Some((vec![CandidateId::new(0), CandidateId::new(2)], 3))
        );
        let reweighted = tileset
            .with_weights(&BTreeMap::from([("b".to_string(), 2.0)]))
            .expect("Valid overrides");
        assert_eq!(reweighted.count_limits(), limits);

        builder.limit_count(["b"], 0);
        assert!(matches!(
            builder.build(),
            Err(DefinitionError::InvalidCountLimit { .. })
        ));

        let mut empty = TileSet::builder(DirectionSet::cartesian_2d());
        empty.add_candidate_default("a");
        empty.limit_count(Vec::<String>::new(), 1);
        assert!(matches!(
            empty.build(),
            Err(DefinitionError::InvalidCountLimit { .. })
        ));

        let mut unknown = TileSet::builder(DirectionSet::cartesian_2d());
        unknown.add_candidate_default("a");
        unknown.limit_count(["z"], 1);
        assert!(matches!(
            unknown.build(),
            Err(DefinitionError::UndefinedCandidate { .. })
        ));
    }

    #[test]
    fn test_describe() {
        let tileset = road_tileset();
        assert_eq!(tileset.describe(CandidateId::new(0)), "[0]grass(W3.00)");
        assert_eq!(tileset.describe(CandidateId::new(7)), "[7]");
    }
}
