//! Shared run state between the sampler and the reporter
//!
//! One writer (the sampler, plus the shutdown path for the running flag),
//! many readers. Reads of the next-sample time are advisory and only feed the
//! countdown display.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::Notify;

use crate::types::Timestamp;

/// Running flag and next scheduled sample time
#[derive(Debug)]
pub struct ClockState {
    running: AtomicBool,
    /// Seconds on the wall-clock axis (see [`Timestamp::epoch_seconds`])
    next_sample_at: AtomicI64,
    /// Wakes tasks parked in [`ClockState::stopped`]
    stop_notify: Notify,
}

impl ClockState {
    /// Create a running clock with the first sample scheduled at `next_sample_at`
    #[must_use]
    pub fn new(next_sample_at: Timestamp) -> Self {
        Self {
            running: AtomicBool::new(true),
            next_sample_at: AtomicI64::new(next_sample_at.epoch_seconds()),
            stop_notify: Notify::new(),
        }
    }

    #[must_use]
    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag
    ///
    /// Returns `true` if this call performed the transition.
    pub fn stop(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::AcqRel);
        if was_running {
            self.stop_notify.notify_waiters();
        }
        was_running
    }

    /// Resolve once the clock has been stopped
    ///
    /// Meant to be raced against long operations with `tokio::select!`.
    pub async fn stopped(&self) {
        let notified = self.stop_notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent stop is not missed
        notified.as_mut().enable();
        if !self.is_running() {
            return;
        }
        notified.await;
    }

    pub fn set_next_sample_at(&self, at: Timestamp) {
        self.next_sample_at.store(at.epoch_seconds(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn next_sample_at(&self) -> Option<Timestamp> {
        Timestamp::from_epoch_seconds(self.next_sample_at.load(Ordering::Relaxed))
    }

    /// Whole seconds until the next sample, floored at zero
    #[must_use]
    pub fn seconds_until_next_sample(&self, now: Timestamp) -> u64 {
        let remaining = self.next_sample_at.load(Ordering::Relaxed) - now.epoch_seconds();
        remaining.max(0).unsigned_abs()
    }
}
