//! Per-instance submission cooldown.

use std::time::Duration;

use tokio::time::Instant;

/// Remembers when the last submission was accepted and rejects new ones until `period` has passed.
#[derive(Debug, Clone)]
pub struct Cooldown {
    period: Duration,
    last_accepted: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_accepted: None,
        }
    }

    /// `Err(wait_seconds)` while the cooldown is active. The wait is rounded up to whole seconds.
    pub fn check(&self, now: Instant) -> Result<(), u64> {
        let Some(last) = self.last_accepted else {
            return Ok(());
        };

        let elapsed = now.saturating_duration_since(last);
        if elapsed >= self.period {
            return Ok(());
        }

        let remaining = self.period - elapsed;
        Err(remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0))
    }

    /// Only call this once a submission has been persisted.
    pub fn record(&mut self, now: Instant) {
        self.last_accepted = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cooldown_allows_submission() {
        let cooldown = Cooldown::new(Duration::from_secs(60));
        assert_eq!(cooldown.check(Instant::now()), Ok(()));
    }

    #[test]
    fn test_wait_is_rounded_up() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_secs(60));
        cooldown.record(start);

        assert_eq!(cooldown.check(start + Duration::from_secs(10)), Err(50));
        assert_eq!(cooldown.check(start + Duration::from_millis(10_001)), Err(50));
        assert_eq!(cooldown.check(start + Duration::from_millis(59_999)), Err(1));
        assert_eq!(cooldown.check(start), Err(60));
    }

    #[test]
    fn test_sub_millisecond_remainder_still_waits_a_second() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_secs(60));
        cooldown.record(start);

        assert_eq!(cooldown.check(start + Duration::from_micros(59_999_500)), Err(1));
        assert_eq!(cooldown.check(start + Duration::from_nanos(59_999_999_999)), Err(1));
    }

    #[test]
    fn test_expires_after_period() {
        let start = Instant::now();
        let mut cooldown = Cooldown::new(Duration::from_secs(60));
        cooldown.record(start);
        assert_eq!(cooldown.check(start + Duration::from_secs(60)), Ok(()));
        assert_eq!(cooldown.check(start + Duration::from_secs(61)), Ok(()));
    }
}
