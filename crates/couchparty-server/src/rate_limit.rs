use std::time::Instant;

/// Token bucket capping how many frames one connection may submit.
///
/// The bucket holds at most one second of budget, so a controller that
/// goes quiet cannot save up a burst larger than `per_sec`.
pub struct FrameBudget {
    available: f64,
    capacity: f64,
    per_sec: f64,
    refilled_at: Instant,
    /// Frames refused since the last accepted one.
    refused: u64,
}

impl FrameBudget {
    pub fn per_second(per_sec: f64, now: Instant) -> Self {
        Self {
            available: per_sec,
            capacity: per_sec,
            per_sec,
            refilled_at: now,
            refused: 0,
        }
    }

    /// Spend one frame of budget at `now`. Returns false when exhausted.
    pub fn try_spend(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.available = (self.available + elapsed * self.per_sec).min(self.capacity);
        self.refilled_at = now;

        if self.available < 1.0 {
            self.refused += 1;
            return false;
        }
        self.available -= 1.0;
        self.refused = 0;
        true
    }

    /// Refusals in the current run; 1 means this is the first of a burst.
    pub fn refused(&self) -> u64 {
        self.refused
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn burst_is_capped_then_refills() {
        let start = Instant::now();
        let mut budget = FrameBudget::per_second(2.0, start);
        assert!(budget.try_spend(start));
        assert!(budget.try_spend(start));
        assert!(!budget.try_spend(start));
        assert_eq!(budget.refused(), 1);

        let later = start + Duration::from_millis(500);
        assert!(budget.try_spend(later));
        assert_eq!(budget.refused(), 0);
        assert!(!budget.try_spend(later));
    }

    #[test]
    fn idle_time_does_not_bank_extra_frames() {
        let start = Instant::now();
        let mut budget = FrameBudget::per_second(3.0, start);
        let later = start + Duration::from_secs(60);
        let allowed = (0..10).filter(|_| budget.try_spend(later)).count();
        assert_eq!(allowed, 3);
        assert_eq!(budget.refused(), 7);
    }
}
