//! Level-gauge device emulator (v1)
//!
//! Accepts a single client on loopback, answers its Hello and reports the
//! connection lifecycle.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                 DEVICE EMULATOR                  │
//!                  │                                                  │
//!   Test client    │  ┌──────────┐    ┌────────────┐    ┌──────────┐  │
//!   ───────────────┼─▶│   net    │───▶│ lifecycle  │───▶│ protocol │  │
//!                  │  │ listener │    │   driver   │    │handshake │  │
//!                  │  └──────────┘    └─────▲──────┘    └──────────┘  │
//!                  │                        │ PeerLost                 │
//!                  │                  ┌─────┴──────┐                   │
//!                  │                  │   health   │                   │
//!                  │                  │  liveness  │                   │
//!                  │                  └────────────┘                   │
//!                  │  config · observability · shutdown/signals        │
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use device_emulator::lifecycle::signals::shutdown_on_signal;
use device_emulator::lifecycle::startup::{init_observability, resolve_config, StartupOptions};
use device_emulator::{AlwaysReady, LifecycleDriver, Shutdown};

#[derive(Parser)]
#[command(name = "device-emulator")]
#[command(about = "Emulates the TCP side of a level-gauge device", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener host
    #[arg(long)]
    host: Option<String>,

    /// Override listener port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&StartupOptions {
        config_path: cli.config,
        host: cli.host,
        port: cli.port,
    })?;
    init_observability(&config)?;

    tracing::info!("device-emulator v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    let (driver, _handle) = LifecycleDriver::new(config, AlwaysReady);
    let mut emulator = tokio::spawn(driver.run(shutdown.subscribe()));

    tokio::select! {
        finished = &mut emulator => {
            finished??;
            return Ok(());
        }
        _ = shutdown_on_signal(&shutdown) => {}
    }

    emulator.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
