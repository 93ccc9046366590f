// Benchmark for steering conversion and watcher schedule computation
// Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use parknet_rs::scheduler::{AdaptiveSchedule, StabilityTracker};
use parknet_rs::steering::SteeringModel;
use std::hint::black_box;

fn bench_steering_model(c: &mut Criterion) {
    let model = SteeringModel::new(vec![0.0004, -0.002, 0.05, 2.5, 307.0]);
    c.bench_function("steering duty sweep -20..20 deg", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for tenth in -200..=200 {
                total += model.duty(black_box(tenth as f64 / 10.0));
            }
            total
        });
    });
}

fn bench_schedule(c: &mut Criterion) {
    let schedule = AdaptiveSchedule::from_secs(0.05, 30.0, 20).unwrap();
    c.bench_function("stability tracker 1k results", |b| {
        b.iter(|| {
            let mut tracker = StabilityTracker::new(schedule);
            let mut total = std::time::Duration::ZERO;
            for i in 0..1000u32 {
                total += tracker.record(black_box(i % 37 != 0));
            }
            total
        });
    });
}

criterion_group!(benches, bench_steering_model, bench_schedule);
criterion_main!(benches);
