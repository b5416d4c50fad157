//! # Flight Params
//!
//! Acquire fundamental flight parameters from a telemetry bus and aggregate
//! them into one snapshot per cycle.
//!
//! The binary runs the full acquisition lifecycle against the simulated bus:
//! allocate the snapshot once, establish the subscriptions once, then cycle
//! `fill_snapshot` at a fixed period until Ctrl+C.

use anyhow::Result;
use tokio::time::{interval, Duration};
use tracing::{info, warn};
use tracing_subscriber;

use flight_params::aggregator::{CycleVerdict, SnapshotAggregator};
use flight_params::bus::sim::SimBus;
use flight_params::config::AcquireConfig;
use flight_params::error::AcquireError;
use flight_params::registry::ChannelRegistry;
use flight_params::snapshot::FlightSnapshot;

/// Default configuration file path
const CONFIG_PATH: &str = "flight-params.toml";

/// Main entry point for the flight-params acquisition loop
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Load configuration (defaults if no file is present)
///    - Subscribe all telemetry channels via the registry
///    - Allocate the snapshot (once, caller-owned)
///
/// 2. **Main Loop**
///    - Run one acquisition cycle per tick
///    - An empty or failed wait window skips the cycle and retries on the next
///    - Log a snapshot status line every N cycles
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop cycling
///    - Log total and partial cycle counts
///    - Clean exit
///
/// # Errors
///
/// Returns error if:
/// - Configuration file is present but invalid
/// - Channel subscriptions cannot be established (fatal, no retry)
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Flight Params v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = AcquireConfig::load_or_default(CONFIG_PATH)?;

    let bus = SimBus::new(Duration::from_millis(config.sim.publish_period_ms));
    let registry = ChannelRegistry::initialize(bus, config.sample_interval())?;
    let mut aggregator = SnapshotAggregator::new(registry, config.wait_timeout());

    // Allocated once; updated in place every cycle
    let mut snapshot = FlightSnapshot::new();

    let mut cycle_interval = interval(Duration::from_millis(config.sim.cycle_period_ms));

    info!(
        "Starting acquisition loop ({}ms cycle, {}ms wait bound)",
        config.sim.cycle_period_ms, config.bus.wait_timeout_ms
    );
    info!("Press Ctrl+C to exit");

    let mut cycle_count: u64 = 0;
    let mut partial_count: u64 = 0;
    let mut skipped_count: u64 = 0;

    // Main acquisition loop
    loop {
        tokio::select! {
            _ = cycle_interval.tick() => {
                cycle_count += 1;

                match aggregator.fill_snapshot(&mut snapshot).await {
                    Ok(report) => {
                        if report.verdict() == CycleVerdict::Partial {
                            partial_count += 1;
                        }
                    }
                    // Cycle-fatal but recoverable: retry on the next tick
                    Err(AcquireError::NoData) => {
                        skipped_count += 1;
                        warn!("cycle {}: no fresh telemetry, retrying next cycle", cycle_count);
                        continue;
                    }
                    Err(AcquireError::Wait(e)) => {
                        skipped_count += 1;
                        warn!("cycle {}: bus wait failed ({}), retrying next cycle", cycle_count, e);
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                }

                if cycle_count % config.sim.status_every_cycles == 0 {
                    info!(
                        "cycle {}: alt {:.1}m, pressure {:.1}mbar, attitude ({:.1}, {:.1}, {:.1})°, accel ({:.2}, {:.2}, {:.2})m/s²",
                        cycle_count,
                        snapshot.altitude(),
                        snapshot.pressure(),
                        snapshot.roll(),
                        snapshot.pitch(),
                        snapshot.yaw(),
                        snapshot.accel_x(),
                        snapshot.accel_y(),
                        snapshot.accel_z(),
                    );
                }
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                info!(
                    "Total cycles: {} ({} partial, {} skipped)",
                    cycle_count, partial_count, skipped_count
                );
                break;
            }
        }
    }

    Ok(())
}
