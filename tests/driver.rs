// Integration tests for the driver: steering and mode ownership
mod common;

use common::{create_test_config, static_vehicle};
use parknet_rs::Direction;
use parknet_rs::hardware::SimulatedActuator;
use parknet_rs::hardware::sim::PulseRecord;
use parknet_rs::steering;
use std::time::Duration;

#[tokio::test]
async fn test_steer_clamps_angle() {
    let vehicle = static_vehicle(100.0, 100.0, Duration::ZERO);

    let over = vehicle.driver.steer(35.0).await.unwrap();
    let at_max = vehicle.driver.steer(20.0).await.unwrap();
    let under = vehicle.driver.steer(-90.0).await.unwrap();
    let inside = vehicle.driver.steer(5.0).await.unwrap();

    let coefficients = create_test_config().steering.coefficients;
    assert_eq!(over, at_max);
    assert_eq!(over, steering::evaluate(20.0, &coefficients));
    assert_eq!(under, steering::evaluate(-20.0, &coefficients));
    assert_eq!(inside, steering::evaluate(5.0, &coefficients));

    let duties = vehicle.actuator.duties();
    assert_eq!(duties.len(), 4);
    assert!(duties.iter().all(|(channel, _)| *channel == 0));
    assert_eq!(duties[0].1, duties[1].1);
}

#[tokio::test]
async fn test_steering_ignores_obstacles() {
    let vehicle = static_vehicle(0.0, 0.0, Duration::ZERO);
    assert!(vehicle.driver.steer(10.0).await.is_ok());
    assert_eq!(vehicle.actuator.duties().len(), 1);
}

#[tokio::test]
async fn test_new_mode_cancels_previous() {
    let mut vehicle = static_vehicle(1000.0, 1000.0, Duration::ZERO);

    let first = vehicle.driver.forward();
    assert!(first.is_active());
    assert_eq!(first.direction(), Direction::Forward);

    let second = vehicle.driver.backward();
    assert!(!first.is_active());
    assert!(second.is_active());
    assert_eq!(second.direction(), Direction::Backward);

    first.do_for(5.0).await.unwrap();
    assert_eq!(vehicle.actuator.pulse_count(), 0);

    second.do_for(1.0).await.unwrap();
    assert_eq!(vehicle.actuator.pulses(), vec![PulseRecord { clockwise: false, steps: 80 }]);
}

#[tokio::test(start_paused = true)]
async fn test_switching_direction_stops_running_loop() {
    let mut vehicle = static_vehicle(1000.0, 1000.0, Duration::from_millis(1));
    let first = vehicle.driver.forward();
    let task = tokio::spawn({
        let first = first.clone();
        async move { first.do_while(|| true).await }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    let second = vehicle.driver.backward();
    let forward_batches = vehicle.actuator.pulse_count();
    task.await.unwrap().unwrap();

    assert!(forward_batches > 0);
    assert_eq!(vehicle.actuator.pulse_count(), forward_batches);
    assert!(vehicle.actuator.pulses().iter().all(|p| p.clockwise));

    second.do_for(1.0).await.unwrap();
    let pulses = vehicle.actuator.pulses();
    assert_eq!(pulses.last(), Some(&PulseRecord { clockwise: false, steps: 80 }));
}

#[tokio::test]
async fn test_stop_and_current_mode() {
    let mut vehicle = static_vehicle(1000.0, 1000.0, Duration::ZERO);
    assert!(vehicle.driver.current_mode().is_none());

    let mode = vehicle.driver.forward();
    let current = vehicle.driver.current_mode().unwrap();
    assert!(std::sync::Arc::ptr_eq(&mode, &current));

    vehicle.driver.stop();
    assert!(!mode.is_active());
    assert!(vehicle.driver.current_mode().is_none());
    // stopping twice is harmless
    vehicle.driver.stop();
}

#[tokio::test]
async fn test_shared_driver_handle() {
    let vehicle = static_vehicle(1000.0, 1000.0, Duration::ZERO);
    let actuator: std::sync::Arc<SimulatedActuator> = vehicle.actuator.clone();
    let driver = std::sync::Arc::new(tokio::sync::Mutex::new(vehicle.driver));

    let mode = {
        let driver = driver.clone();
        tokio::spawn(async move { driver.lock().await.forward() }).await.unwrap()
    };
    mode.do_for(1.0).await.unwrap();
    driver.lock().await.stop();

    assert!(!mode.is_active());
    assert_eq!(actuator.odometer(), 80);
}
