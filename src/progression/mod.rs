// Stage progression - hand-off state machine and elapsed-time sampling

pub mod engine;
pub mod sampler;

use chrono::{DateTime, Utc};

pub use engine::{submit_handoff, HandoffOutcome};
pub use sampler::{sample_active_member, ElapsedUpdate};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Fractional days between two instants, at millisecond resolution.
///
/// Never negative: an `end` before `start` (clock skew) counts as zero.
pub fn elapsed_days(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / MILLIS_PER_DAY
    }
}

/// Round a day count to one decimal place for display.
pub fn round_days(days: f64) -> f64 {
    (days * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_elapsed_days_is_fractional() {
        let start = Utc::now();
        assert!((elapsed_days(start, start + Duration::hours(12)) - 0.5).abs() < 1e-9);
        assert!((elapsed_days(start, start + Duration::days(3)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_days_clamps_skew_to_zero() {
        let start = Utc::now();
        assert_eq!(elapsed_days(start, start - Duration::minutes(5)), 0.0);
    }

    #[test]
    fn test_round_days() {
        assert_eq!(round_days(0.0417), 0.0);
        assert_eq!(round_days(0.06), 0.1);
        assert_eq!(round_days(2.449), 2.4);
        assert_eq!(round_days(2.45), 2.5);
    }
}
