// src/motion/driver.rs - Owner of the drive and steering actuators
use std::sync::Arc;

use super::{Direction, MotionMode};
use crate::config::{Config, DrivingConfig};
use crate::hardware::{ActuatorPort, HardwareError, RangeSource};
use crate::steering::SteeringModel;

/// Top-level vehicle driver.
///
/// Construct one per process and share it by handle
/// (`Arc<tokio::sync::Mutex<Driver>>`) if several tasks issue intents. At
/// most one [`MotionMode`] is live at a time: starting a new one stops the
/// previous one before it is replaced.
pub struct Driver {
    driving: DrivingConfig,
    steering: SteeringModel,
    steering_channel: u8,
    actuator: Arc<dyn ActuatorPort>,
    ranges: Arc<dyn RangeSource>,
    current_mode: Option<Arc<MotionMode>>,
}

impl Driver {
    pub fn new(config: &Config, actuator: Arc<dyn ActuatorPort>, ranges: Arc<dyn RangeSource>) -> Self {
        tracing::info!(
            "Driver ready: step unit {}, safety distance {}, steering {}..{} deg",
            config.driving.step_unit,
            config.driving.safety_distance,
            config.driving.min_angle,
            config.driving.max_angle
        );
        Self {
            driving: config.driving.clone(),
            steering: SteeringModel::new(config.steering.coefficients.clone()),
            steering_channel: config.steering.channel,
            actuator,
            ranges,
            current_mode: None,
        }
    }

    pub fn driving(&self) -> &DrivingConfig {
        &self.driving
    }

    /// Clamp `angle`, convert it to a duty value and write it to the servo.
    /// Returns the duty value written.
    pub async fn steer(&self, angle: f64) -> Result<f64, HardwareError> {
        let clamped = self.driving.clamp_angle(angle);
        let duty = self.steering.duty(clamped);
        tracing::debug!("Steering {:.1} deg (requested {:.1}) -> duty {:.1}", clamped, angle, duty);
        self.actuator.set_steering_duty(self.steering_channel, duty).await?;
        Ok(duty)
    }

    pub fn forward(&mut self) -> Arc<MotionMode> {
        self.mode(Direction::Forward)
    }

    pub fn backward(&mut self) -> Arc<MotionMode> {
        self.mode(Direction::Backward)
    }

    /// Stop the current mode, if any, without starting a new one.
    pub fn stop(&mut self) {
        if let Some(mode) = self.current_mode.take() {
            mode.stop();
        }
    }

    pub fn current_mode(&self) -> Option<Arc<MotionMode>> {
        self.current_mode.clone()
    }

    fn mode(&mut self, direction: Direction) -> Arc<MotionMode> {
        self.stop();
        let mode = Arc::new(MotionMode::new(
            direction,
            self.driving.clone(),
            self.actuator.clone(),
            self.ranges.clone(),
        ));
        self.current_mode = Some(mode.clone());
        mode
    }
}
