// src/motion/mod.rs - Direction/mode state machine for the drive motor

pub mod driver;
pub mod mode;

pub use driver::Driver;
pub use mode::MotionMode;

use crate::hardware::RangeSensor;

/// Travel direction of a motion mode. Fixed for the lifetime of the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Rotational sense of the drive motor; forward turns clockwise.
    pub fn clockwise(self) -> bool {
        matches!(self, Direction::Forward)
    }

    /// Range sensor facing the direction of travel.
    pub fn facing_sensor(self) -> RangeSensor {
        match self {
            Direction::Forward => RangeSensor::Front,
            Direction::Backward => RangeSensor::Rear,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}
