//! Exponential poll delay with jitter.

use rand::Rng;
use std::time::Duration;

/// Delay before poll number `attempt + 1`.
///
/// Doubles from `base` per attempt, capped at `max`, plus up to 10% jitter.
pub fn poll_delay(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let base_ms = base.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_delay_growth_and_cap() {
        let base = Duration::from_millis(100);
        let max = Duration::from_millis(1000);

        assert_eq!(poll_delay(0, base, max), Duration::ZERO);

        let first = poll_delay(1, base, max);
        assert!(first >= base && first < Duration::from_millis(110));

        let second = poll_delay(2, base, max);
        assert!(second >= Duration::from_millis(200));

        let capped = poll_delay(30, base, max);
        assert!(capped >= max && capped < Duration::from_millis(1100));
    }
}
