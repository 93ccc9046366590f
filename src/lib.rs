//! On-board drive control for a small autonomous ground vehicle.
//!
//! Converts travel and steering intents into stepper pulses and servo duty
//! values while keeping a minimum clearance to obstacles reported by the
//! range sensors.

pub mod config;
pub mod hardware;
pub mod motion;
pub mod scheduler;
pub mod steering;

pub use config::{Config, ConfigError, DrivingConfig, SteeringConfig};
pub use hardware::{ActuatorPort, HardwareError, RangeSensor, RangeSource};
pub use motion::{Direction, Driver, MotionMode};
pub use scheduler::{AdaptiveSchedule, AdaptiveScheduler, SchedulerError};
pub use steering::SteeringModel;
