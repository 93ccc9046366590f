// Shared fixtures for drive integration tests
#![allow(dead_code)]

use parknet_rs::hardware::{SimulatedActuator, SimulatedRanges};
use parknet_rs::{Config, Driver, RangeSensor};
use std::sync::Arc;
use std::time::Duration;

pub struct Vehicle {
    pub driver: Driver,
    pub actuator: Arc<SimulatedActuator>,
    pub ranges: Arc<SimulatedRanges>,
}

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.driving.min_angle = -20.0;
    config.driving.max_angle = 20.0;
    config.driving.step_unit = 80;
    config.driving.distance_per_step = 0.0125;
    config.driving.safety_distance = 10.0;
    config.driving.retry_interval_ms = 1000;
    config.steering.channel = 0;
    config.steering.coefficients = vec![0.05, 2.5, 307.0];
    config
}

/// Vehicle whose sensors stay fixed regardless of motion.
pub fn static_vehicle(front: f64, rear: f64, step_period: Duration) -> Vehicle {
    let ranges = Arc::new(SimulatedRanges::new(front));
    ranges.set(RangeSensor::Rear, rear);
    let actuator = Arc::new(SimulatedActuator::new(step_period));
    let driver = Driver::new(&create_test_config(), actuator.clone(), ranges.clone());
    Vehicle { driver, actuator, ranges }
}

/// Vehicle whose front/rear clearance follows the distance driven.
pub fn moving_vehicle(front: f64, rear: f64) -> Vehicle {
    let config = create_test_config();
    let ranges = Arc::new(SimulatedRanges::new(front));
    ranges.set(RangeSensor::Rear, rear);
    let actuator = Arc::new(
        SimulatedActuator::new(Duration::ZERO).with_ranges(ranges.clone(), config.driving.distance_per_step),
    );
    let driver = Driver::new(&config, actuator.clone(), ranges.clone());
    Vehicle { driver, actuator, ranges }
}
