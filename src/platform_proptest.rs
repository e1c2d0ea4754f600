//! Property-based tests for OS pattern matching.
//!
//! These tests use proptest to generate random patterns and verify that the
//! dispatch rule holds for every supported target.

#[cfg(test)]
mod proptest_tests {
    use crate::platform::{applicable_runs, applies, TargetOs};
    use proptest::prelude::*;

    fn target() -> impl Strategy<Value = TargetOs> {
        prop::sample::select(TargetOs::ALL.to_vec())
    }

    fn token() -> impl Strategy<Value = String> {
        prop_oneof![
            target().prop_map(|os| os.identifier().to_string()),
            Just("any".to_string()),
            "[a-z]{1,8}".prop_filter("macos is an alias", |s| s != "macos"),
        ]
    }

    proptest! {
        /// Property: the run count equals the number of tokens naming the
        /// target or the wildcard
        #[test]
        fn run_count_matches_token_count(
            tokens in prop::collection::vec(token(), 1..6),
            os in target(),
        ) {
            let pattern = tokens.join(" ");
            let expected = tokens
                .iter()
                .filter(|t| t.as_str() == "any" || t.as_str() == os.identifier())
                .count();
            prop_assert_eq!(applicable_runs(&pattern, os), expected);
        }

        /// Property: extra whitespace between tokens never changes the result
        #[test]
        fn whitespace_is_insignificant(
            tokens in prop::collection::vec(token(), 0..6),
            os in target(),
        ) {
            let single = tokens.join(" ");
            let padded = format!("  {}\t", tokens.join(" \t "));
            prop_assert_eq!(applicable_runs(&single, os), applicable_runs(&padded, os));
        }

        /// Property: a pattern naming the target always applies
        #[test]
        fn naming_the_target_applies(
            tokens in prop::collection::vec(token(), 0..4),
            os in target(),
        ) {
            let pattern = format!("{} {}", tokens.join(" "), os.identifier());
            prop_assert!(applies(&pattern, os));
        }
    }
}
