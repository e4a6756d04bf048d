//! Tests for the decision stack and exact rollback to each decision

#[cfg(test)]
mod tests {
    use wavetile::algorithm::backtrack::DecisionStack;
    use wavetile::algorithm::bitset::Domain;
    use wavetile::spatial::grid::Grid;
    use wavetile::{CandidateId, GridShape};

    fn grid() -> Grid {
        Grid::with_candidates(GridShape::rect(3, 1), 3).expect("Failed to build grid")
    }

    // Tests rewinding restores exactly the pre-collapse domains
    // Verified by rolling back to the current trail length instead of the recorded mark
    #[test]
    fn test_rewind_restores_domains() {
        let mut grid = grid();
        let mut history = DecisionStack::new();
        let before = grid.snapshot();

        history.record(&grid, 1, CandidateId::new(2));
        assert!(grid.restrict(1, &Domain::single(3, CandidateId::new(2))).is_ok());
        assert!(grid.remove(0, CandidateId::new(0)).is_ok());
        assert!(!grid.matches(&before));

        let rewound = history.rewind(&mut grid);
        assert_eq!(rewound, Ok(Some((1, CandidateId::new(2)))));
        assert!(grid.matches(&before));
        assert!(history.is_empty());
    }

    // Tests decisions unwind in reverse order
    // Verified by popping from the front of the stack
    #[test]
    fn test_rewind_is_last_in_first_out() {
        let mut grid = grid();
        let mut history = DecisionStack::new();

        history.record(&grid, 0, CandidateId::new(0));
        assert!(grid.restrict(0, &Domain::single(3, CandidateId::new(0))).is_ok());
        let middle = grid.snapshot();
        history.record(&grid, 2, CandidateId::new(1));
        assert!(grid.restrict(2, &Domain::single(3, CandidateId::new(1))).is_ok());

        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|decision| decision.cell), Some(2));

        assert_eq!(history.rewind(&mut grid), Ok(Some((2, CandidateId::new(1)))));
        assert!(grid.matches(&middle));
        assert_eq!(history.rewind(&mut grid), Ok(Some((0, CandidateId::new(0)))));
        assert_eq!(grid.domain_size(0), 3);
    }

    // Tests rewinding an empty history leaves the grid alone
    // Verified by rolling back to mark 0 on empty history
    #[test]
    fn test_rewind_empty_history() {
        let mut grid = grid();
        assert!(grid.remove(1, CandidateId::new(1)).is_ok());
        let current = grid.snapshot();

        let mut history = DecisionStack::new();
        assert_eq!(history.rewind(&mut grid), Ok(None));
        assert!(grid.matches(&current));
    }

    // Tests decisions hold a trail mark rather than a copy of the grid
    // Verified by recording the mark after the collapse
    #[test]
    fn test_record_marks() {
        let mut grid = grid();
        let mut history = DecisionStack::new();
        assert!(grid.remove(2, CandidateId::new(0)).is_ok());

        history.record(&grid, 0, CandidateId::new(1));
        assert!(grid.restrict(0, &Domain::single(3, CandidateId::new(1))).is_ok());
        history.record(&grid, 1, CandidateId::new(1));

        assert_eq!(history.last().map(|decision| decision.mark), Some(3));
        assert!(history.rewind(&mut grid).is_ok());
        assert_eq!(history.last().map(|decision| decision.mark), Some(1));
    }

    // Tests a mark invalidated by a commit surfaces as a violation
    // Verified by ignoring marks past the trail
    #[test]
    fn test_rewind_after_commit() {
        let mut grid = grid();
        let mut history = DecisionStack::new();
        assert!(grid.remove(0, CandidateId::new(0)).is_ok());
        history.record(&grid, 1, CandidateId::new(0));
        grid.commit();

        let violation = history.rewind(&mut grid).expect_err("Mark is past the trail");
        assert_eq!(violation.operation, "rollback");
    }

    #[test]
    fn test_clear() {
        let grid = grid();
        let mut history = DecisionStack::default();
        history.record(&grid, 0, CandidateId::new(0));
        history.clear();
        assert!(history.is_empty());
    }
}
