// src/main.rs - Command line front end for the drive layer
use clap::{Parser, Subcommand};
use parknet_rs::config::{self, Config};
use parknet_rs::hardware::{
    ActuatorPort, CachedRange, McuActuator, RangeArray, RangeSensor, RangeSource, SimulatedActuator,
    SimulatedRanges,
};
use parknet_rs::motion::{Driver, MotionMode};
use parknet_rs::scheduler::{self, AdaptiveScheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_CONFIG: &str = "vehicle.toml";

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Drive the vehicle with one motion primitive at a time.
#[derive(Parser, Debug)]
#[command(name = "parknet-drive", about = "Safe stepper drive and steering control.")]
struct Cli {
    /// Path to a TOML config file (defaults to ./vehicle.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serial device of the drive MCU; a simulated vehicle is used without it
    #[arg(long)]
    serial: Option<String>,

    #[arg(long, default_value_t = 250_000)]
    baud: u32,

    /// Initial clearance reported by the simulated range sensors
    #[arg(long, default_value_t = 100.0)]
    clearance: f64,

    /// Give up on a motion after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set the steering angle in degrees
    Steer {
        #[arg(allow_hyphen_values = true)]
        angle: f64,
    },
    /// Drive forward for a distance
    Forward {
        #[arg(allow_hyphen_values = true)]
        distance: f64,
    },
    /// Drive backward for a distance
    Backward {
        #[arg(allow_hyphen_values = true)]
        distance: f64,
    },
    /// Watch the front clearance for a number of seconds
    Watch { seconds: u64 },
}

fn load(cli: &Cli) -> Result<Config, config::ConfigError> {
    match &cli.config {
        Some(path) => config::load_config(path),
        None if Path::new(DEFAULT_CONFIG).exists() => config::load_config(DEFAULT_CONFIG),
        None => {
            tracing::info!("No {} found, using built-in defaults", DEFAULT_CONFIG);
            Ok(Config::default())
        }
    }
}

async fn run_motion(mode: Arc<MotionMode>, distance: f64, limit: Duration) -> Result<(), BoxError> {
    let mut task = tokio::spawn({
        let mode = mode.clone();
        async move { mode.do_for(distance).await }
    });
    tokio::select! {
        joined = &mut task => return Ok(joined??),
        _ = tokio::signal::ctrl_c() => tracing::warn!("Interrupted, stopping"),
        _ = tokio::time::sleep(limit) => tracing::warn!("Motion not finished after {:?}, stopping", limit),
    }
    mode.stop();
    task.await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .init();

    tracing::info!("Starting parknet drive control");

    let config = load(&cli).map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        Box::new(e) as BoxError
    })?;

    let simulated = Arc::new(SimulatedRanges::new(cli.clearance).with_noise(0.2));
    let mut ranges = RangeArray::new();
    for position in RangeSensor::ALL {
        let source = simulated.clone();
        ranges = ranges.with_sensor(
            position,
            CachedRange::new(move || source.read(position), config.sensors.refresh_interval()),
        );
    }
    let ranges: Arc<dyn RangeSource> = Arc::new(ranges);

    let actuator: Arc<dyn ActuatorPort> = match &cli.serial {
        Some(device) => {
            tracing::warn!("Range sensors are simulated at {} clearance", cli.clearance);
            Arc::new(McuActuator::open(device, cli.baud)?)
        }
        None => Arc::new(
            SimulatedActuator::new(Duration::from_millis(1))
                .with_ranges(simulated.clone(), config.driving.distance_per_step),
        ),
    };

    let mut driver = Driver::new(&config, actuator, ranges.clone());
    let limit = Duration::from_secs(cli.timeout);

    match cli.command {
        Commands::Steer { angle } => {
            let duty = driver.steer(angle).await?;
            tracing::info!("Steering set: {:.1} deg -> duty {:.1}", angle, duty);
        }
        Commands::Forward { distance } => {
            run_motion(driver.forward(), distance, limit).await?;
        }
        Commands::Backward { distance } => {
            run_motion(driver.backward(), distance, limit).await?;
        }
        Commands::Watch { seconds } => {
            let watcher = AdaptiveScheduler::new("front-clearance", config.watcher.schedule()?);
            let handle = watcher.spawn(scheduler::clearance_probe(
                ranges,
                RangeSensor::Front,
                config.watcher.tolerance,
            ));
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
                _ = tokio::signal::ctrl_c() => tracing::warn!("Interrupted"),
            }
            handle.abort();
        }
    }

    driver.stop();
    tracing::info!("Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_arguments_parse() {
        let cli = Cli::try_parse_from(["parknet-drive", "backward", "-2.5"]).unwrap();
        assert!(matches!(cli.command, Commands::Backward { distance } if distance == -2.5));

        let cli = Cli::try_parse_from(["parknet-drive", "forward", "-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Forward { distance } if distance == -1.0));

        let cli = Cli::try_parse_from(["parknet-drive", "--timeout", "5", "steer", "-12"]).unwrap();
        assert!(matches!(cli.command, Commands::Steer { angle } if angle == -12.0));
        assert_eq!(cli.timeout, 5);
    }
}
