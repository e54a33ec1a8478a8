use std::time::{Duration, Instant};

/// Cooperative periodic task polled from the UI loop.
///
/// `start` arms it, `cancel` disarms it. While armed, `poll` reports a tick at
/// most once per interval; once cancelled it never ticks again until restarted.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PeriodicTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arms the task; the first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a tick is due and reschedules the next one.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                // Reschedule from now so a stalled loop never bursts.
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    /// Time until the next tick, `None` while cancelled.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
