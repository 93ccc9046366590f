// src/scheduler/mod.rs - Background condition watchers
pub mod adaptive;

pub use adaptive::{AdaptiveSchedule, AdaptiveScheduler, SchedulerError, StabilityTracker};

use std::sync::Arc;

use crate::hardware::{RangeSensor, RangeSource};

/// Probe that is stable while `sensor` changes by less than `tolerance`
/// between consecutive calls. The first call is always stable.
pub fn clearance_probe(
    source: Arc<dyn RangeSource>,
    sensor: RangeSensor,
    tolerance: f64,
) -> impl FnMut() -> bool + Send + 'static {
    let mut last: Option<f64> = None;
    move || {
        let reading = source.read(sensor);
        let stable = match last {
            Some(previous) => (reading - previous).abs() < tolerance,
            None => true,
        };
        if !stable {
            tracing::info!("{:?} clearance changed: {:.1}", sensor, reading);
        }
        last = Some(reading);
        stable
    }
}
