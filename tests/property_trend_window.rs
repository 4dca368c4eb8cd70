use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use vigil::domain::models::scan_record::{TrendWindow, TREND_CAPACITY};

proptest! {
    /// Property: the window never exceeds its capacity, whatever is
    /// appended.
    #[test]
    fn prop_window_never_exceeds_capacity(counts in proptest::collection::vec(0u64..10_000, 0..40)) {
        let mut window = TrendWindow::new();
        for (i, count) in counts.iter().enumerate() {
            let timestamp = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            window.push(timestamp, *count);
            prop_assert!(window.len() <= TREND_CAPACITY);
        }
    }

    /// Property: the window keeps exactly the most recent samples, in
    /// insertion order (oldest evicted first).
    #[test]
    fn prop_window_keeps_newest_samples_in_order(counts in proptest::collection::vec(0u64..10_000, 1..40)) {
        let mut window = TrendWindow::new();
        for (i, count) in counts.iter().enumerate() {
            let timestamp = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            window.push(timestamp, *count);
        }

        let expected: Vec<u64> = counts
            .iter()
            .rev()
            .take(TREND_CAPACITY)
            .rev()
            .copied()
            .collect();
        let actual: Vec<u64> = window.samples().iter().map(|s| s.count).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: timestamps stay non-decreasing after eviction.
    #[test]
    fn prop_window_timestamps_monotonic(len in 1usize..40) {
        let mut window = TrendWindow::new();
        for i in 0..len {
            let timestamp = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            window.push(timestamp, 1);
        }
        let stamps: Vec<_> = window.samples().iter().map(|s| s.timestamp).collect();
        let mut sorted = stamps.clone();
        sorted.sort();
        prop_assert_eq!(stamps, sorted);
    }
}
