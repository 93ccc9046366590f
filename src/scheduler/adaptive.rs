// src/scheduler/adaptive.rs - Polling with exponentially growing intervals
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error, PartialEq)]
pub enum SchedulerError {
    #[error("Minimum delay ({min}s) must be less than maximum delay ({max}s)")]
    InvalidDelays { min: f64, max: f64 },
    #[error("Delays must be positive and finite")]
    NonPositiveDelay,
    #[error("It must take at least one step to reach the maximum delay")]
    InvalidSteps,
}

/// Delay ramp from `min_delay` to `max_delay` over `steps` stable results.
///
/// `delay(s) = min(max_delay, min_delay * exp(s * ln(max_delay) / steps))`,
/// with delays in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveSchedule {
    min_delay: f64,
    max_delay: f64,
    steps: u32,
}

impl AdaptiveSchedule {
    pub fn new(min_delay: Duration, max_delay: Duration, steps: u32) -> Result<Self, SchedulerError> {
        Self::from_secs(min_delay.as_secs_f64(), max_delay.as_secs_f64(), steps)
    }

    pub fn from_secs(min_delay: f64, max_delay: f64, steps: u32) -> Result<Self, SchedulerError> {
        if !(min_delay.is_finite() && max_delay.is_finite()) || min_delay <= 0.0 {
            return Err(SchedulerError::NonPositiveDelay);
        }
        if min_delay >= max_delay {
            return Err(SchedulerError::InvalidDelays { min: min_delay, max: max_delay });
        }
        if steps < 1 {
            return Err(SchedulerError::InvalidSteps);
        }
        Ok(Self { min_delay, max_delay, steps })
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_secs_f64(self.min_delay)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay)
    }

    pub fn delay(&self, stable_streak: u32) -> Duration {
        let exponent = stable_streak as f64 * self.max_delay.ln() / self.steps as f64;
        let secs = (self.min_delay * exponent.exp()).min(self.max_delay);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Consecutive-stable counter driving an [`AdaptiveSchedule`].
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    schedule: AdaptiveSchedule,
    stable_streak: u32,
}

impl StabilityTracker {
    pub fn new(schedule: AdaptiveSchedule) -> Self {
        Self { schedule, stable_streak: 0 }
    }

    pub fn stable_streak(&self) -> u32 {
        self.stable_streak
    }

    /// Record a probe result and return the delay before the next probe.
    ///
    /// A stable result waits on the streak it extends, so a fresh run starts
    /// at `min_delay`. An unstable result drops straight back to `min_delay`.
    pub fn record(&mut self, stable: bool) -> Duration {
        if !stable {
            self.stable_streak = 0;
            return self.schedule.delay(0);
        }
        let delay = self.schedule.delay(self.stable_streak);
        self.stable_streak = self.stable_streak.saturating_add(1);
        delay
    }
}

/// Background runner for a condition probe (`true` = stable).
#[derive(Debug, Clone)]
pub struct AdaptiveScheduler {
    name: String,
    schedule: AdaptiveSchedule,
}

impl AdaptiveScheduler {
    pub fn new(name: impl Into<String>, schedule: AdaptiveSchedule) -> Self {
        Self { name: name.into(), schedule }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `probe` forever on a tokio task. Abort the handle to tear it down.
    pub fn spawn<F>(&self, mut probe: F) -> JoinHandle<()>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let name = self.name.clone();
        let mut tracker = StabilityTracker::new(self.schedule);
        tracing::info!(
            "Starting watcher '{}' ({:?}..{:?})",
            name,
            self.schedule.min_delay(),
            self.schedule.max_delay()
        );
        tokio::spawn(async move {
            loop {
                let stable = probe();
                let delay = tracker.record(stable);
                tracing::trace!(
                    "Watcher '{}': stable={} streak={} next in {:?}",
                    name,
                    stable,
                    tracker.stable_streak(),
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        })
    }
}
