use std::{cell::Cell, rc::Rc, time::Duration, time::Instant};

use chrono::{DateTime, Utc};

/// Source of monotonic and calendar time.
pub trait Clock {
    fn now(&self) -> Instant;
    fn utc_now(&self) -> DateTime<Utc>;
}

/// Reads tokio's clock so paused-time tests see virtual time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    base_utc: DateTime<Utc>,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new(base_utc: DateTime<Utc>) -> Self {
        Self {
            base: Instant::now(),
            base_utc,
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.offset.get()).unwrap_or_else(|_| chrono::Duration::zero());
        self.base_utc + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_both_readings_together() {
        let clock = ManualClock::new(Utc::now());
        let start = clock.now();
        let start_utc = clock.utc_now();

        let shared = clock.clone();
        shared.advance(Duration::from_millis(1500));

        assert_eq!(clock.now() - start, Duration::from_millis(1500));
        assert_eq!((clock.utc_now() - start_utc).num_milliseconds(), 1500);
    }
}
