// src/hardware/serial.rs - Text command actuator for the drive MCU
use async_trait::async_trait;
use serial2_tokio::SerialPort;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::timeout;

use super::{ActuatorPort, HardwareError};

const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives the stepper and steering servo through a line-based MCU protocol.
///
/// Commands:
/// - `step <cw> <steps>` where `cw` is `1` for clockwise (forward). The MCU
///   answers `ok` or `done` once the steps have been taken.
/// - `pwm <channel> <duty>` with the duty rounded to a whole count. Not
///   acknowledged.
///
/// A reply starting with `error` fails the pending step. Other lines are
/// skipped.
pub struct McuActuator<P> {
    port: Mutex<BufReader<P>>,
    write_timeout: Duration,
    response_timeout: Duration,
}

impl McuActuator<SerialPort> {
    pub fn open(device: &str, baud: u32) -> Result<Self, HardwareError> {
        tracing::info!("Connecting to drive MCU: {} at {} baud", device, baud);
        let port = SerialPort::open(device, baud)?;
        tracing::info!("Connected to drive MCU successfully");
        Ok(Self::new(port))
    }
}

impl<P> McuActuator<P>
where
    P: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(port: P) -> Self {
        Self {
            port: Mutex::new(BufReader::new(port)),
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    pub fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }

    /// Longest wait for the completion reply of a `step` command, motion included.
    pub fn with_response_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = response_timeout;
        self
    }

    async fn write_command(&self, port: &mut BufReader<P>, command: &str) -> Result<(), HardwareError> {
        tracing::debug!("MCU <- {}", command);
        let line = format!("{}\n", command);
        let write = async {
            port.write_all(line.as_bytes()).await?;
            port.flush().await
        };
        match timeout(self.write_timeout, write).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::warn!("MCU command timed out: {}", command);
                Err(HardwareError::Timeout)
            }
        }
    }

    async fn wait_for_completion(&self, port: &mut BufReader<P>, command: &str) -> Result<(), HardwareError> {
        match timeout(self.response_timeout, read_completion(port)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("No completion from MCU after {:?}: {}", self.response_timeout, command);
                Err(HardwareError::Timeout)
            }
        }
    }
}

async fn read_completion<R>(reader: &mut R) -> Result<(), HardwareError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = String::new();
    loop {
        buffer.clear();
        if reader.read_line(&mut buffer).await? == 0 {
            tracing::error!("MCU closed the connection");
            return Err(HardwareError::Disconnected);
        }
        let reply = buffer.trim();
        if reply.is_empty() {
            continue;
        }
        tracing::debug!("MCU -> {}", reply);
        match reply {
            "ok" | "done" => return Ok(()),
            _ if reply.starts_with("error") => return Err(HardwareError::Rejected(reply.to_string())),
            _ => {}
        }
    }
}

pub(crate) fn step_command(clockwise: bool, steps: u32) -> String {
    format!("step {} {}", if clockwise { 1 } else { 0 }, steps)
}

pub(crate) fn pwm_command(channel: u8, value: f64) -> String {
    format!("pwm {} {}", channel, value.round() as i64)
}

#[async_trait]
impl<P> ActuatorPort for McuActuator<P>
where
    P: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn pulse(&self, clockwise: bool, steps: u32) -> Result<(), HardwareError> {
        let command = step_command(clockwise, steps);
        let mut port = self.port.lock().await;
        self.write_command(&mut port, &command).await?;
        self.wait_for_completion(&mut port, &command).await
    }

    async fn set_steering_duty(&self, channel: u8, value: f64) -> Result<(), HardwareError> {
        let mut port = self.port.lock().await;
        self.write_command(&mut port, &pwm_command(channel, value)).await
    }
}
