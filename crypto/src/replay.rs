//! Replay guard for timestamped webhooks.

/// Default freshness window: five minutes either side of now.
pub const REPLAY_WINDOW_SECS: u64 = 300;

/// Whether a claimed send time is within `window_secs` of `now`.
///
/// A missing timestamp counts as fresh: only some providers send one, and
/// the others rely on the signature alone.
pub fn is_fresh(claimed: Option<i64>, now: i64, window_secs: u64) -> bool {
    match claimed {
        None => true,
        Some(ts) => now.abs_diff(ts) <= window_secs,
    }
}

/// Parse a timestamp header value (decimal Unix seconds).
///
/// Returns `None` for anything that is not an integer; callers treat that
/// as a replay failure rather than as an absent header.
pub fn parse_timestamp_header(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn now_is_fresh() {
        assert!(is_fresh(Some(NOW), NOW, REPLAY_WINDOW_SECS));
    }

    #[test]
    fn window_edge() {
        assert!(is_fresh(Some(NOW - 300), NOW, REPLAY_WINDOW_SECS));
        assert!(!is_fresh(Some(NOW - 301), NOW, REPLAY_WINDOW_SECS));
        assert!(!is_fresh(Some(NOW + 301), NOW, REPLAY_WINDOW_SECS));
    }

    #[test]
    fn missing_timestamp_is_fresh() {
        assert!(is_fresh(None, NOW, REPLAY_WINDOW_SECS));
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert!(!is_fresh(Some(i64::MIN), i64::MAX, REPLAY_WINDOW_SECS));
    }

    #[test]
    fn header_parsing() {
        assert_eq!(parse_timestamp_header(" 1700000000 "), Some(NOW));
        assert_eq!(parse_timestamp_header("yesterday"), None);
        assert_eq!(parse_timestamp_header(""), None);
    }

    proptest! {
        #[test]
        fn freshness_matches_distance(offset in -10_000i64..10_000, window in 0u64..5_000) {
            let fresh = is_fresh(Some(NOW + offset), NOW, window);
            prop_assert_eq!(fresh, offset.unsigned_abs() <= window);
        }
    }
}
