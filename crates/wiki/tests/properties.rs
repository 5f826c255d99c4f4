use codewiki_wiki::{health_score, slugify, MAX_HEALTH};
use proptest::prelude::*;

proptest! {
    #[test]
    fn slugify_is_idempotent(text in ".{0,64}") {
        let once = slugify(&text);
        prop_assert_eq!(slugify(&once), once.clone());
        prop_assert!(!once.is_empty());
        prop_assert!(!once.starts_with('-') && !once.ends_with('-'));
        prop_assert!(!once.contains("--"));
        prop_assert!(once.chars().all(|c| c == '-' || c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn health_is_bounded_and_non_increasing(
        complexity in 0.0f64..50.0,
        hotspots in 0usize..30,
        cycles in 0usize..30,
    ) {
        let score = health_score(complexity, hotspots, cycles);
        prop_assert!(score <= MAX_HEALTH);
        prop_assert!(health_score(complexity, hotspots + 1, cycles) <= score);
        prop_assert!(health_score(complexity, hotspots, cycles + 1) <= score);
        prop_assert!(health_score(complexity + 5.0, hotspots, cycles) <= score);
    }
}
