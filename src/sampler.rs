//! Background sampling loop
//!
//! Each cycle polls the source, appends a reading to the log, publishes the
//! next sample time, then waits out the interval. Source failures become
//! unavailable readings. Log write failures are retried with backoff and,
//! if they persist, stop the whole program with an error: losing samples
//! silently is never acceptable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::clock::ClockState;
use crate::constants::{SHUTDOWN_POLL, write_backoff};
use crate::source::ProgressSource;
use crate::store::{LogError, ProgressLog, codec};
use crate::types::{Reading, Sample, Timestamp};

/// Errors that end the sampler
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SamplerError {
    #[error("giving up after {attempts} attempts: {source}")]
    LogWrite {
        attempts: u32,
        #[source]
        source: LogError,
    },

    /// Shutdown was requested during a poll or while a write was being retried
    #[error("stopped before reading could be written")]
    Interrupted,
}

/// Sampler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SamplerState {
    Waiting = 0,
    Polling = 1,
    Appending = 2,
    Stopped = 3,
}

impl SamplerState {
    const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Waiting,
            1 => Self::Polling,
            2 => Self::Appending,
            _ => Self::Stopped,
        }
    }
}

/// Exponential backoff between log write attempts
#[derive(Debug, Clone)]
pub struct WriteBackoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl WriteBackoff {
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        Self {
            initial,
            max: max.max(initial),
            current: initial,
        }
    }

    /// Delay before the next attempt; doubles up to the cap
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for WriteBackoff {
    fn default() -> Self {
        Self::new(write_backoff::INITIAL, write_backoff::MAX)
    }
}

/// Polls a source on a fixed interval and appends readings to the log
pub struct Sampler {
    source: Arc<dyn ProgressSource>,
    log: ProgressLog,
    clock: Arc<ClockState>,
    interval: Duration,
    max_write_attempts: u32,
    backoff: WriteBackoff,
    state: AtomicU8,
}

impl Sampler {
    pub fn new(
        source: Arc<dyn ProgressSource>,
        log: ProgressLog,
        clock: Arc<ClockState>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            log,
            clock,
            interval,
            max_write_attempts: crate::config::max_write_attempts(),
            backoff: WriteBackoff::default(),
            state: AtomicU8::new(SamplerState::Waiting as u8),
        }
    }

    /// Set how many times a failed append is attempted before giving up
    #[must_use]
    pub fn with_max_write_attempts(mut self, attempts: u32) -> Self {
        self.max_write_attempts = attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: WriteBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: SamplerState) {
        let prev = self.state.swap(state as u8, Ordering::AcqRel);
        if prev != state as u8 {
            debug!("Sampler {:?} -> {:?}", SamplerState::from_u8(prev), state);
        }
    }

    /// Run until the clock is stopped
    ///
    /// On a persistent log write failure the clock is stopped so the reporter
    /// exits too, and the error is returned.
    ///
    /// # Errors
    /// Returns [`SamplerError::LogWrite`] when an append keeps failing.
    pub async fn run(&mut self) -> Result<(), SamplerError> {
        info!(
            "Sampling {} every {:?} into {}",
            self.source.describe(),
            self.interval,
            self.log.path().display()
        );

        while self.clock.is_running() {
            match self.sample_once().await {
                Ok(_) => {}
                Err(SamplerError::Interrupted) => break,
                Err(e) => {
                    error!("Sampler stopping: {}", e);
                    self.clock.stop();
                    self.set_state(SamplerState::Stopped);
                    return Err(e);
                }
            }

            self.set_state(SamplerState::Waiting);
            if !wait_while_running(&self.clock, self.interval).await {
                break;
            }
        }

        self.set_state(SamplerState::Stopped);
        info!("Sampler stopped");
        Ok(())
    }

    /// One poll + append cycle
    ///
    /// # Errors
    /// Returns an error when the reading could not be written, or
    /// [`SamplerError::Interrupted`] when the clock stops mid-poll.
    pub async fn sample_once(&mut self) -> Result<Reading, SamplerError> {
        self.set_state(SamplerState::Polling);
        let timestamp = Timestamp::now();
        let polled = tokio::select! {
            biased;
            polled = self.source.poll() => polled,
            () = self.clock.stopped() => {
                info!("Stopped while polling {}; no reading taken", self.source.describe());
                return Err(SamplerError::Interrupted);
            }
        };
        let sample = match polled {
            Ok(value) => {
                let sample = Sample::from(value);
                debug!("Polled {}", value);
                sample
            }
            Err(e) => {
                warn!("Progress unavailable: {}", e);
                Sample::Unavailable
            }
        };
        let reading = Reading::new(timestamp, sample);

        self.set_state(SamplerState::Appending);
        self.append_with_retry(&reading).await?;

        let next = Timestamp::now().epoch_seconds() + self.interval.as_secs() as i64;
        if let Some(next) = Timestamp::from_epoch_seconds(next) {
            self.clock.set_next_sample_at(next);
        }

        match reading.sample {
            Sample::Percent(p) => info!("Recorded {}%", p),
            Sample::Unavailable => info!("Recorded unavailable sample"),
        }
        Ok(reading)
    }

    async fn append_with_retry(&mut self, reading: &Reading) -> Result<(), SamplerError> {
        self.backoff.reset();
        let mut attempt = 1;
        loop {
            match self.log.append(reading).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.max_write_attempts => {
                    return Err(SamplerError::LogWrite {
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    warn!(
                        "Write attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, self.max_write_attempts, e, delay
                    );
                    if !wait_while_running(&self.clock, delay).await {
                        warn!(
                            "Stopped during write retry; dropping reading {}",
                            codec::encode(reading)
                        );
                        return Err(SamplerError::Interrupted);
                    }
                    attempt += 1;
                }
            }
        }
    }
}

/// Sleep for `total` in short ticks, returning early once the clock stops
///
/// Returns `true` if the full duration elapsed while still running.
pub async fn wait_while_running(clock: &ClockState, total: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + total;
    loop {
        if !clock.is_running() {
            return false;
        }
        let now = tokio::time::Instant::now();
        if now >= deadline {
            return true;
        }
        tokio::time::sleep(SHUTDOWN_POLL.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct FixedSource(Option<f64>);

    #[async_trait]
    impl ProgressSource for FixedSource {
        async fn poll(&self) -> Result<f64, SourceError> {
            self.0.ok_or(SourceError::Unavailable)
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    /// Stops the clock after a number of polls
    struct CountingSource {
        polls: AtomicUsize,
        stop_after: usize,
        clock: Arc<ClockState>,
    }

    #[async_trait]
    impl ProgressSource for CountingSource {
        async fn poll(&self) -> Result<f64, SourceError> {
            let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= self.stop_after {
                self.clock.stop();
            }
            Ok(n as f64)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn clock() -> Arc<ClockState> {
        Arc::new(ClockState::new(Timestamp::now()))
    }

    #[test]
    fn test_backoff_doubles_to_cap() {
        let mut backoff = WriteBackoff::new(Duration::from_secs(1), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        assert_eq!(backoff.next_delay(), Duration::from_secs(5));
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_clamps_zero_initial() {
        let mut backoff = WriteBackoff::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_sample_once_records_value_and_schedules_next() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        let clock = clock();
        let mut sampler = Sampler::new(
            Arc::new(FixedSource(Some(42.5))),
            log.clone(),
            clock.clone(),
            Duration::from_secs(300),
        );

        let before = Timestamp::now();
        let reading = sampler.sample_once().await.unwrap();
        assert_eq!(reading.sample.value(), Some(42.5));
        assert_eq!(sampler.state(), SamplerState::Appending);

        let countdown = clock.seconds_until_next_sample(before);
        assert!((299..=302).contains(&countdown), "countdown {}", countdown);

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.trim_end().ends_with("42.500%"));
    }

    #[tokio::test]
    async fn test_source_failure_records_nan() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        let mut sampler = Sampler::new(
            Arc::new(FixedSource(None)),
            log.clone(),
            clock(),
            Duration::from_secs(300),
        );

        let reading = sampler.sample_once().await.unwrap();
        assert!(reading.sample.is_unavailable());

        let text = std::fs::read_to_string(log.path()).unwrap();
        assert!(text.trim_end().ends_with("NaN%"));
        assert!(log.read_history().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_failure_gives_up_and_stops_clock() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("missing/progress.log"));
        let clock = clock();
        let mut sampler = Sampler::new(
            Arc::new(FixedSource(Some(1.0))),
            log,
            clock.clone(),
            Duration::from_secs(300),
        )
        .with_max_write_attempts(3)
        .with_backoff(WriteBackoff::new(
            Duration::from_millis(1),
            Duration::from_millis(2),
        ));

        let err = sampler.run().await.unwrap_err();
        assert!(matches!(err, SamplerError::LogWrite { attempts: 3, .. }));
        assert!(!clock.is_running());
        assert_eq!(sampler.state(), SamplerState::Stopped);
    }

    #[tokio::test]
    async fn test_write_retry_recovers() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("late");
        let log = ProgressLog::new(sub.join("progress.log"));
        let mut sampler = Sampler::new(
            Arc::new(FixedSource(Some(3.0))),
            log.clone(),
            clock(),
            Duration::from_secs(300),
        )
        .with_max_write_attempts(50)
        .with_backoff(WriteBackoff::new(
            Duration::from_millis(20),
            Duration::from_millis(20),
        ));

        let creator = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            std::fs::create_dir_all(&sub).unwrap();
        });

        sampler.sample_once().await.unwrap();
        creator.await.unwrap();
        assert_eq!(log.read_history().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_exits_when_clock_stops() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        let clock = clock();
        let source = Arc::new(CountingSource {
            polls: AtomicUsize::new(0),
            stop_after: 1,
            clock: clock.clone(),
        });
        let mut sampler = Sampler::new(source, log.clone(), clock, Duration::from_secs(3600));

        tokio::time::timeout(Duration::from_secs(5), sampler.run())
            .await
            .expect("sampler should stop promptly")
            .unwrap();

        assert_eq!(sampler.state(), SamplerState::Stopped);
        assert_eq!(log.read_history().await.unwrap().len(), 1);
    }

    /// Never answers until the clock stops it
    struct StalledSource;

    #[async_trait]
    impl ProgressSource for StalledSource {
        async fn poll(&self) -> Result<f64, SourceError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(99.0)
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test]
    async fn test_stop_interrupts_inflight_poll() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("progress.log"));
        let clock = clock();
        let mut sampler = Sampler::new(
            Arc::new(StalledSource),
            log.clone(),
            clock.clone(),
            Duration::from_secs(300),
        );

        let stopper = clock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        tokio::time::timeout(Duration::from_secs(1), sampler.run())
            .await
            .expect("stop should cut the poll short")
            .unwrap();

        assert_eq!(sampler.state(), SamplerState::Stopped);
        assert!(!log.path().exists());
    }

    #[tokio::test]
    async fn test_stop_during_write_retry_is_interrupted() {
        let dir = TempDir::new().unwrap();
        let log = ProgressLog::new(dir.path().join("missing/progress.log"));
        let clock = clock();
        let mut sampler = Sampler::new(
            Arc::new(FixedSource(Some(7.0))),
            log,
            clock.clone(),
            Duration::from_secs(300),
        )
        .with_max_write_attempts(50)
        .with_backoff(WriteBackoff::new(
            Duration::from_secs(10),
            Duration::from_secs(10),
        ));

        let stopper = clock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), sampler.sample_once())
            .await
            .expect("retry wait should end on stop")
            .unwrap_err();
        assert!(matches!(err, SamplerError::Interrupted));
    }

    #[tokio::test]
    async fn test_wait_while_running_returns_early() {
        let clock = clock();
        let stopper = clock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stopper.stop();
        });

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            wait_while_running(&clock, Duration::from_secs(3600)),
        )
        .await
        .unwrap();
        assert!(!finished);
    }

    #[tokio::test]
    async fn test_wait_while_running_completes() {
        let clock = clock();
        assert!(wait_while_running(&clock, Duration::from_millis(10)).await);
    }
}
