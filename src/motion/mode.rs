// src/motion/mode.rs - Cancelable single-direction stepping loop
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Direction;
use crate::config::DrivingConfig;
use crate::hardware::{ActuatorPort, HardwareError, RangeSource};

/// One in-flight motion command.
///
/// Steps are issued in batches of `step_unit`. Before every batch the sensor
/// facing the direction of travel is read and the batch is only issued if the
/// predicted clearance after it stays at or above `safety_distance`; an unsafe
/// batch waits `retry_interval` and is checked again. Residual motion after
/// `stop()` is bounded by the one batch that may already be in flight.
pub struct MotionMode {
    active: AtomicBool,
    direction: Direction,
    driving: DrivingConfig,
    actuator: Arc<dyn ActuatorPort>,
    ranges: Arc<dyn RangeSource>,
}

impl std::fmt::Debug for MotionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionMode")
            .field("active", &self.is_active())
            .field("direction", &self.direction)
            .finish()
    }
}

impl MotionMode {
    pub(crate) fn new(
        direction: Direction,
        driving: DrivingConfig,
        actuator: Arc<dyn ActuatorPort>,
        ranges: Arc<dyn RangeSource>,
    ) -> Self {
        Self {
            active: AtomicBool::new(true),
            direction,
            driving,
            actuator,
            ranges,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Deactivate the mode. Idempotent and irreversible; a pulse already
    /// issued runs to completion, only the next batch is prevented.
    pub fn stop(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            tracing::debug!("Motion mode ({}) stopped", self.direction);
        }
    }

    /// Drive `distance`, i.e. `round(step_unit * distance)` steps.
    pub async fn do_for(&self, distance: f64) -> Result<(), HardwareError> {
        let steps = (self.step_unit() as f64 * distance).round().max(0.0) as u64;
        tracing::info!("Driving {} for {} ({} steps)", self.direction, distance, steps);
        self.go(steps).await
    }

    /// Drive one batch at a time while the mode is active and `condition`
    /// holds. The condition is checked between batches only.
    pub async fn do_while<F>(&self, mut condition: F) -> Result<(), HardwareError>
    where
        F: FnMut() -> bool + Send,
    {
        tracing::info!("Driving {} while condition holds", self.direction);
        while self.is_active() && condition() {
            self.go(self.step_unit()).await?;
        }
        Ok(())
    }

    async fn go(&self, mut steps: u64) -> Result<(), HardwareError> {
        let unit = self.step_unit();
        while self.is_active() && steps >= unit {
            if self.movement_possible(unit) {
                self.actuator.pulse(self.direction.clockwise(), unit as u32).await?;
                steps -= unit;
            } else {
                tracing::debug!(
                    "Batch of {} steps {} blocked by obstacle, retrying in {:?}",
                    unit,
                    self.direction,
                    self.driving.retry_interval()
                );
                tokio::time::sleep(self.driving.retry_interval()).await;
            }
        }

        if steps == 0 {
            return Ok(());
        }
        if self.movement_possible(steps) {
            self.actuator.pulse(self.direction.clockwise(), steps as u32).await?;
        } else if self.is_active() {
            // The remainder is not retried.
            tracing::warn!("Dropping final {} steps {}: clearance too small", steps, self.direction);
        }
        Ok(())
    }

    fn movement_possible(&self, steps: u64) -> bool {
        if !self.is_active() {
            return false;
        }
        let reading = self.ranges.read(self.direction.facing_sensor());
        let predicted = reading - self.driving.distance_per_step * steps as f64;
        predicted >= self.driving.safety_distance
    }

    fn step_unit(&self) -> u64 {
        u64::from(self.driving.step_unit.max(1))
    }
}
