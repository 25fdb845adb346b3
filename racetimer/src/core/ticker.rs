use std::time::{Duration, Instant};

/// Ticker fires at a fixed cadence when it is polled with the current time. A fresh or reset
/// ticker fires at the first poll. At most one tick is reported per poll, missed ticks are not
/// caught up with a burst.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Ticker {
        Ticker {
            interval,
            next_due: None,
        }
    }

    pub fn get_interval(&self) -> Duration {
        self.interval
    }

    /// reset makes the ticker fire at the next poll.
    pub fn reset(&mut self) {
        self.next_due = None;
    }

    /// fire returns true if a tick is due at the given time and schedules the next one.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(next_due) if now < next_due => false,
            Some(next_due) => {
                // keep the cadence unless the caller fell behind by more than one interval
                let next = next_due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }
}
