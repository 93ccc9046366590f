// src/hardware/range.rs - Cached ultrasonic ranging
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use super::{RangeSensor, RangeSource};

/// One raw distance measurement from a sensor driver. May be slow.
pub trait DistanceProbe: Send {
    fn measure(&mut self) -> f64;
}

impl<F> DistanceProbe for F
where
    F: FnMut() -> f64 + Send,
{
    fn measure(&mut self) -> f64 {
        self()
    }
}

struct CacheState {
    probe: Box<dyn DistanceProbe>,
    value: f64,
    last_update: Option<Instant>,
}

/// Range sensor that re-measures at most once per refresh interval.
pub struct CachedRange {
    refresh_interval: Duration,
    state: Mutex<CacheState>,
}

impl CachedRange {
    pub fn new(probe: impl DistanceProbe + 'static, refresh_interval: Duration) -> Self {
        Self {
            refresh_interval,
            state: Mutex::new(CacheState {
                probe: Box::new(probe),
                value: 0.0,
                last_update: None,
            }),
        }
    }

    /// Current reading, measuring again only when the cached one has expired.
    pub fn value(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let expired = match state.last_update {
            Some(last) => now.duration_since(last) >= self.refresh_interval,
            None => true,
        };
        if expired {
            state.value = state.probe.measure();
            state.last_update = Some(now);
            tracing::trace!("Range refreshed: {:.2}", state.value);
        }
        state.value
    }
}

/// The vehicle's mounted range sensors.
///
/// A position without a sensor reads 0.0, so motion toward it is never
/// considered safe.
#[derive(Default)]
pub struct RangeArray {
    sensors: [Option<CachedRange>; 4],
}

impl RangeArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensor(mut self, position: RangeSensor, sensor: CachedRange) -> Self {
        self.sensors[position.index()] = Some(sensor);
        self
    }

    pub fn is_mounted(&self, position: RangeSensor) -> bool {
        self.sensors[position.index()].is_some()
    }
}

impl RangeSource for RangeArray {
    fn read(&self, sensor: RangeSensor) -> f64 {
        self.sensors[sensor.index()]
            .as_ref()
            .map(CachedRange::value)
            .unwrap_or(0.0)
    }
}
