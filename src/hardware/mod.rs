// src/hardware/mod.rs - Actuator and range sensor seams of the drive layer
pub mod range;
pub mod serial;
pub mod sim;

pub use range::{CachedRange, DistanceProbe, RangeArray};
pub use serial::McuActuator;
pub use sim::{SimulatedActuator, SimulatedRanges};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("Serial port error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timeout waiting for MCU")]
    Timeout,
    #[error("MCU connection closed")]
    Disconnected,
    #[error("MCU rejected command: {0}")]
    Rejected(String),
}

/// Mounting position of an ultrasonic range sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSensor {
    Front,
    Right,
    Rear,
    RearAngled,
}

impl RangeSensor {
    pub const ALL: [RangeSensor; 4] = [
        RangeSensor::Front,
        RangeSensor::Right,
        RangeSensor::Rear,
        RangeSensor::RearAngled,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            RangeSensor::Front => 0,
            RangeSensor::Right => 1,
            RangeSensor::Rear => 2,
            RangeSensor::RearAngled => 3,
        }
    }
}

/// Latest distance reading per sensor position.
///
/// Readings may be stale within the sensor's refresh window. A read never
/// fails; an implementation returns its last known value instead.
pub trait RangeSource: Send + Sync {
    fn read(&self, sensor: RangeSensor) -> f64;
}

/// Drive motor and steering servo outputs.
#[async_trait]
pub trait ActuatorPort: Send + Sync {
    /// Issue `steps` motor pulses. Returns once the motion has been performed.
    async fn pulse(&self, clockwise: bool, steps: u32) -> Result<(), HardwareError>;

    /// Set the continuous steering signal on a PWM channel.
    async fn set_steering_duty(&self, channel: u8, value: f64) -> Result<(), HardwareError>;
}
