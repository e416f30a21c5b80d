//! Shared utilities for emulator integration tests.

use std::time::Duration;

use device_emulator::config::EmulatorConfig;
use device_emulator::lifecycle::{DriverError, Transition};
use device_emulator::protocol::{Command, DeviceRequest, DeviceResponse};
use device_emulator::{AlwaysReady, ConfigurationHook, EmulatorHandle, LifecycleDriver, Shutdown};
use prost::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Generous upper bound for anything that should take a tick or two.
pub const SETTLE: Duration = Duration::from_secs(2);

/// An emulator running on an ephemeral loopback port.
pub struct RunningEmulator {
    pub handle: EmulatorHandle,
    pub shutdown: Shutdown,
    pub task: JoinHandle<Result<(), DriverError>>,
    pub transitions: broadcast::Receiver<Transition>,
}

impl RunningEmulator {
    pub async fn connect(&self) -> TcpStream {
        let addr = self
            .handle
            .wait_for_local_addr(SETTLE)
            .await
            .expect("listener never bound");
        TcpStream::connect(addr).await.unwrap()
    }

    /// Trigger shutdown and wait for the driver to return.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(SETTLE, self.task)
            .await
            .expect("driver did not stop")
            .unwrap()
            .unwrap();
    }
}

pub fn test_config() -> EmulatorConfig {
    let mut config = EmulatorConfig::default();
    config.listener.port = 0;
    config
}

pub fn start_emulator() -> RunningEmulator {
    start_emulator_with(test_config(), AlwaysReady)
}

pub fn start_emulator_with<H>(config: EmulatorConfig, hook: H) -> RunningEmulator
where
    H: ConfigurationHook + 'static,
{
    let (driver, handle) = LifecycleDriver::new(config, hook);
    let transitions = handle.subscribe_transitions();
    let shutdown = Shutdown::new();
    let task = tokio::spawn(driver.run(shutdown.subscribe()));

    RunningEmulator {
        handle,
        shutdown,
        task,
        transitions,
    }
}

pub async fn send_command(stream: &mut TcpStream, command: Command) {
    send_raw(stream, &DeviceRequest::new(command).encode_to_vec()).await;
}

pub async fn send_raw(stream: &mut TcpStream, bytes: &[u8]) {
    stream.write_all(bytes).await.unwrap();
}

/// Read one response frame, `None` if nothing arrives within `timeout`.
pub async fn read_response(stream: &mut TcpStream, timeout: Duration) -> Option<DeviceResponse> {
    let mut buf = [0u8; 256];
    match tokio::time::timeout(timeout, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => Some(DeviceResponse::decode_frame(&buf[..n]).unwrap()),
        _ => None,
    }
}

/// Collect transitions until one matches `until`.
pub async fn collect_until(
    transitions: &mut broadcast::Receiver<Transition>,
    until: Transition,
) -> Vec<Transition> {
    tokio::time::timeout(SETTLE, async {
        let mut seen = Vec::new();
        loop {
            let t = transitions.recv().await.unwrap();
            seen.push(t);
            if t == until {
                return seen;
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("never observed {:?}", until))
}
