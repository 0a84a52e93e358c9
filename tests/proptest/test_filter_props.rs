//! Property-based tests for line filtering

use proptest::prelude::*;
use serialterm::LineFilter;

/// Literal patterns; no regex metacharacters so matching is predictable
fn literal() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

proptest! {
    #[test]
    fn test_no_patterns_logs_everything(line in "\\PC*") {
        prop_assert!(LineFilter::new().should_log(&line));
    }

    #[test]
    fn test_filters_decide_alone(
        line in "[a-z ]{0,20}",
        filters in prop::collection::vec(literal(), 1..4),
        ignores in prop::collection::vec(literal(), 0..4),
    ) {
        let mut filter = LineFilter::new();
        for pattern in &ignores {
            filter.add_ignore(pattern).unwrap();
        }
        for pattern in &filters {
            filter.add_filter(pattern).unwrap();
        }

        let expected = filters.iter().any(|p| line.starts_with(p.as_str()));
        prop_assert_eq!(filter.should_log(&line), expected);
    }

    #[test]
    fn test_ignores_without_filters(
        line in "[a-z ]{0,20}",
        ignores in prop::collection::vec(literal(), 1..4),
    ) {
        let mut filter = LineFilter::new();
        for pattern in &ignores {
            filter.add_ignore(pattern).unwrap();
        }

        let expected = !ignores.iter().any(|p| line.starts_with(p.as_str()));
        prop_assert_eq!(filter.should_log(&line), expected);
    }

    #[test]
    fn test_add_then_remove_restores_empty(patterns in prop::collection::vec(literal(), 1..6)) {
        let mut filter = LineFilter::new();
        for pattern in &patterns {
            filter.add_filter(pattern).unwrap();
        }
        for pattern in &patterns {
            filter.remove_filter(pattern).unwrap();
        }
        prop_assert!(filter.filters().is_empty());
    }

    #[test]
    fn test_malformed_pattern_never_panics(source in "\\PC{0,12}") {
        let mut filter = LineFilter::new();
        let before = filter.ignores().len();
        if filter.add_ignore(&source).is_err() {
            prop_assert_eq!(filter.ignores().len(), before);
        }
    }
}
