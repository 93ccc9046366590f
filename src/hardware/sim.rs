//! Simulated range sensors and actuators.
//!
//! Used by the `parknet-drive` binary when no MCU is attached, and by tests.
//! The actuator can be linked to the simulated ranges so that driving toward
//! an obstacle shrinks the clearance reported by the sensor facing it.

use async_trait::async_trait;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::{ActuatorPort, HardwareError, RangeSensor, RangeSource};

/// Settable range readings, one per sensor position.
#[derive(Debug)]
pub struct SimulatedRanges {
    readings: [AtomicU64; 4],
    noise: f64,
}

impl SimulatedRanges {
    pub fn new(initial: f64) -> Self {
        Self {
            readings: std::array::from_fn(|_| AtomicU64::new(initial.to_bits())),
            noise: 0.0,
        }
    }

    /// Add uniform noise of the given peak-to-peak amplitude to every read.
    pub fn with_noise(mut self, amplitude: f64) -> Self {
        self.noise = amplitude;
        self
    }

    pub fn set(&self, sensor: RangeSensor, distance: f64) {
        self.readings[sensor.index()].store(distance.to_bits(), Ordering::Release);
    }

    pub fn get(&self, sensor: RangeSensor) -> f64 {
        f64::from_bits(self.readings[sensor.index()].load(Ordering::Acquire))
    }

    fn shift(&self, sensor: RangeSensor, delta: f64) {
        let slot = &self.readings[sensor.index()];
        let _ = slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
            Some((f64::from_bits(bits) + delta).max(0.0).to_bits())
        });
    }
}

impl RangeSource for SimulatedRanges {
    fn read(&self, sensor: RangeSensor) -> f64 {
        let value = self.get(sensor);
        if self.noise > 0.0 {
            value + self.noise * (rand::random::<f64>() - 0.5)
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRecord {
    pub clockwise: bool,
    pub steps: u32,
}

struct Motion {
    ranges: Arc<SimulatedRanges>,
    distance_per_step: f64,
}

/// Actuator that records every command and models pulse duration.
pub struct SimulatedActuator {
    step_period: Duration,
    pulses: Mutex<Vec<PulseRecord>>,
    duties: Mutex<Vec<(u8, f64)>>,
    odometer: AtomicI64,
    motion: Option<Motion>,
}

impl SimulatedActuator {
    pub fn new(step_period: Duration) -> Self {
        Self {
            step_period,
            pulses: Mutex::new(Vec::new()),
            duties: Mutex::new(Vec::new()),
            odometer: AtomicI64::new(0),
            motion: None,
        }
    }

    /// Move the simulated vehicle relative to its surroundings on every pulse.
    pub fn with_ranges(mut self, ranges: Arc<SimulatedRanges>, distance_per_step: f64) -> Self {
        self.motion = Some(Motion { ranges, distance_per_step });
        self
    }

    pub fn pulses(&self) -> Vec<PulseRecord> {
        self.pulses.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn pulse_count(&self) -> usize {
        self.pulses.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn duties(&self) -> Vec<(u8, f64)> {
        self.duties.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Net steps driven; clockwise (forward) steps count positive.
    pub fn odometer(&self) -> i64 {
        self.odometer.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ActuatorPort for SimulatedActuator {
    async fn pulse(&self, clockwise: bool, steps: u32) -> Result<(), HardwareError> {
        self.pulses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PulseRecord { clockwise, steps });
        let signed = if clockwise { steps as i64 } else { -(steps as i64) };
        self.odometer.fetch_add(signed, Ordering::AcqRel);

        if !self.step_period.is_zero() {
            tokio::time::sleep(self.step_period * steps).await;
        }

        if let Some(motion) = &self.motion {
            let travel = motion.distance_per_step * steps as f64;
            let (ahead, behind) = if clockwise {
                (RangeSensor::Front, RangeSensor::Rear)
            } else {
                (RangeSensor::Rear, RangeSensor::Front)
            };
            motion.ranges.shift(ahead, -travel);
            motion.ranges.shift(behind, travel);
        }
        Ok(())
    }

    async fn set_steering_duty(&self, channel: u8, value: f64) -> Result<(), HardwareError> {
        tracing::debug!("Simulated steering: channel {} <- {:.1}", channel, value);
        self.duties
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((channel, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_ranges_set_and_read() {
        let ranges = SimulatedRanges::new(50.0);
        assert_eq!(ranges.read(RangeSensor::Front), 50.0);
        ranges.set(RangeSensor::Rear, 12.5);
        assert_eq!(ranges.read(RangeSensor::Rear), 12.5);
        assert_eq!(ranges.read(RangeSensor::Front), 50.0);
    }

    #[tokio::test]
    async fn test_noise_stays_within_amplitude() {
        let ranges = SimulatedRanges::new(50.0).with_noise(2.0);
        for _ in 0..100 {
            let value = ranges.read(RangeSensor::Front);
            assert!((49.0..=51.0).contains(&value));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_pulse_moves_linked_ranges() {
        let ranges = Arc::new(SimulatedRanges::new(100.0));
        let actuator = SimulatedActuator::new(Duration::from_millis(1)).with_ranges(ranges.clone(), 0.5);

        actuator.pulse(true, 40).await.unwrap();
        assert_eq!(ranges.get(RangeSensor::Front), 80.0);
        assert_eq!(ranges.get(RangeSensor::Rear), 120.0);

        actuator.pulse(false, 10).await.unwrap();
        assert_eq!(ranges.get(RangeSensor::Front), 85.0);
        assert_eq!(actuator.odometer(), 30);
        assert_eq!(
            actuator.pulses(),
            vec![
                PulseRecord { clockwise: true, steps: 40 },
                PulseRecord { clockwise: false, steps: 10 },
            ]
        );
    }
}
