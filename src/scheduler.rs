//! Phase deadline tracking.
//!
//! Portable pacing without async/await or platform-specific timers: the
//! scheduler only computes how long to wait, the caller does the waiting.
//! Deadlines are absolute, so the time spent issuing a command is absorbed
//! by the following wait instead of stretching every phase.

use embassy_time::{Duration, Instant};

/// Default drift allowed before the schedule is reset.
pub const DEFAULT_MAX_DRIFT: Duration = Duration::from_millis(50);

/// Drift-correcting phase scheduler
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = PhaseScheduler::new(DEFAULT_MAX_DRIFT);
///
/// for phase in cycle.iter() {
///     emit(phase);
///     let wait = scheduler.advance(Instant::now(), phase.duration);
///     sleep(wait);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PhaseScheduler {
    next_deadline: Option<Instant>,
    max_drift: Duration,
}

impl PhaseScheduler {
    pub const fn new(max_drift: Duration) -> Self {
        Self {
            next_deadline: None,
            max_drift,
        }
    }

    /// Schedule a phase that starts now and return how long to wait for its end.
    ///
    /// The phase is anchored to the previous deadline when we are on time.
    /// If we have fallen behind by more than `max_drift`, the schedule restarts
    /// from `now` instead of shortening the following phases to catch up.
    pub fn advance(&mut self, now: Instant, duration: Duration) -> Duration {
        let start = match self.next_deadline {
            Some(deadline) if now <= deadline + self.max_drift => deadline,
            _ => now,
        };

        let deadline = start + duration;
        self.next_deadline = Some(deadline);

        deadline.saturating_duration_since(now)
    }

    /// Deadline of the most recently scheduled phase
    pub const fn next_deadline(&self) -> Option<Instant> {
        self.next_deadline
    }
}

impl Default for PhaseScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DRIFT)
    }
}
