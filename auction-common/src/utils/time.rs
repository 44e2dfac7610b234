use chrono::Utc;

/// Returns the current UNIX timestamp in seconds.
///
/// Stamped on every replicated envelope; purely informational, never used for
/// ordering decisions.
pub fn current_time() -> i64 {
    Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_envelope_stamp_is_in_seconds() {
        let from_std = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let stamp = current_time();

        // Millisecond stamps would be three orders of magnitude larger.
        assert!((stamp - from_std).abs() <= 1);
    }
}
