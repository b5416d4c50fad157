//! # Snapshot Aggregator Module
//!
//! The acquisition-and-aggregation protocol: one bounded wait per cycle, then a
//! source-specific fetch/decode for every channel that reported fresh data.
//!
//! This module handles:
//! - The full-cycle short-circuit on an empty or failed wait
//! - Per-source decoding into engineering units (radians → degrees)
//! - Stale retention for sources that delivered nothing this cycle
//! - Per-source verdicts rolled into one aggregate cycle verdict

use crate::bus::{
    AttitudeSample, ChannelKind, InertialSample, PositionSample, RawSample, TelemetryBus,
};
use crate::error::Result;
use crate::registry::{ChannelRegistry, CHANNEL_COUNT};
use crate::snapshot::FlightSnapshot;
use tokio::time::Duration;
use tracing::{debug, warn};

/// Radians to degrees conversion factor
pub const RAD_TO_DEG: f32 = 57.29747;

/// Default bound for the per-cycle wait (200ms)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(200);

/// Outcome of one source within a single cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Fresh data was fetched, decoded and written into the snapshot
    Updated,
    /// The channel was ready but the fetch or decode failed; snapshot untouched
    Failed,
    /// The channel reported no fresh data this cycle; snapshot untouched
    NotReady,
}

/// Aggregate verdict of one acquisition cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleVerdict {
    /// Every source delivered and was written this cycle
    Complete,
    /// At least one source failed or delivered nothing; the rest were written
    Partial,
}

/// Transient per-cycle result: one status per source
///
/// Returned from each [`SnapshotAggregator::fill_snapshot`] call, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    statuses: [SourceStatus; CHANNEL_COUNT],
}

impl CycleReport {
    fn new() -> Self {
        Self {
            statuses: [SourceStatus::NotReady; CHANNEL_COUNT],
        }
    }

    fn set(&mut self, kind: ChannelKind, status: SourceStatus) {
        self.statuses[kind.index()] = status;
    }

    /// This cycle's status for one source
    pub fn status(&self, kind: ChannelKind) -> SourceStatus {
        self.statuses[kind.index()]
    }

    /// Aggregate verdict: [`CycleVerdict::Complete`] only if every source
    /// updated this cycle
    pub fn verdict(&self) -> CycleVerdict {
        if self
            .statuses
            .iter()
            .all(|status| *status == SourceStatus::Updated)
        {
            CycleVerdict::Complete
        } else {
            CycleVerdict::Partial
        }
    }

    /// Whether every source updated this cycle
    pub fn is_complete(&self) -> bool {
        self.verdict() == CycleVerdict::Complete
    }
}

/// Assembles per-cycle snapshots from the registry's channels
///
/// Depends on [`ChannelRegistry`] for the bounded wait and the per-kind fetch;
/// owns the decode and unit-conversion steps and the verdict bookkeeping.
pub struct SnapshotAggregator<B: TelemetryBus> {
    registry: ChannelRegistry<B>,
    wait_timeout: Duration,
}

impl<B: TelemetryBus> SnapshotAggregator<B> {
    /// Create an aggregator over an initialized registry
    pub fn new(registry: ChannelRegistry<B>, wait_timeout: Duration) -> Self {
        Self {
            registry,
            wait_timeout,
        }
    }

    /// Run one acquisition cycle, updating `snapshot` in place
    ///
    /// Waits (bounded) for fresh data, then for each ready channel fetches and
    /// decodes its latest sample and writes the converted values into the
    /// snapshot. Sources that were not ready or whose fetch failed leave their
    /// snapshot fields untouched.
    ///
    /// # Errors
    ///
    /// - [`AcquireError::NoData`](crate::error::AcquireError::NoData): the
    ///   wait window elapsed with nothing ready; the snapshot is unmodified
    /// - [`AcquireError::Wait`](crate::error::AcquireError::Wait): the wait
    ///   primitive failed; the snapshot is unmodified
    ///
    /// Per-source failures do not error the cycle: they are logged, the source
    /// is marked [`SourceStatus::Failed`], and the returned report's verdict is
    /// [`CycleVerdict::Partial`].
    pub async fn fill_snapshot(&mut self, snapshot: &mut FlightSnapshot) -> Result<CycleReport> {
        // Full-cycle short-circuit: NoData and Wait propagate before any write
        let ready = self.registry.wait_for_data(self.wait_timeout).await?;

        let mut report = CycleReport::new();

        for kind in ChannelKind::ALL {
            // Each source is gated only by its own channel's readiness flag
            if !ready.is_ready(kind) {
                debug!("{} channel not ready, keeping previous values", kind);
                continue;
            }

            let status = match self.registry.fetch_latest(kind) {
                Ok(sample) => apply_sample(snapshot, kind, sample),
                Err(e) => {
                    warn!("error reading {} source: {}", kind, e);
                    SourceStatus::Failed
                }
            };
            report.set(kind, status);
        }

        debug!("cycle verdict: {:?}", report.verdict());
        Ok(report)
    }
}

/// Decode one fetched sample into the snapshot
///
/// Writes happen only on a kind match; a sample of the wrong variant is a
/// per-source decode failure, not a cycle error.
fn apply_sample(
    snapshot: &mut FlightSnapshot,
    kind: ChannelKind,
    sample: RawSample,
) -> SourceStatus {
    match (kind, sample) {
        (ChannelKind::Inertial, RawSample::Inertial(raw)) => {
            apply_inertial(snapshot, raw);
            SourceStatus::Updated
        }
        (ChannelKind::Attitude, RawSample::Attitude(raw)) => {
            apply_attitude(snapshot, raw);
            SourceStatus::Updated
        }
        (ChannelKind::Position, RawSample::Position(raw)) => {
            apply_position(snapshot, raw);
            SourceStatus::Updated
        }
        (kind, sample) => {
            warn!(
                "error reading {} source: bus delivered a {} sample",
                kind,
                sample.kind()
            );
            SourceStatus::Failed
        }
    }
}

/// Extract 3-axis acceleration and scalar pressure
fn apply_inertial(snapshot: &mut FlightSnapshot, raw: InertialSample) {
    snapshot.accel_x_m_s2 = raw.accel_m_s2[0];
    snapshot.accel_y_m_s2 = raw.accel_m_s2[1];
    snapshot.accel_z_m_s2 = raw.accel_m_s2[2];
    snapshot.pressure_mbar = raw.baro_pressure_mbar;
}

/// Extract attitude angles and rates, converting radians to degrees
fn apply_attitude(snapshot: &mut FlightSnapshot, raw: AttitudeSample) {
    snapshot.roll_deg = raw.roll_rad * RAD_TO_DEG;
    snapshot.pitch_deg = raw.pitch_rad * RAD_TO_DEG;
    snapshot.yaw_deg = raw.yaw_rad * RAD_TO_DEG;

    snapshot.roll_rate_deg_s = raw.roll_rate_rad_s * RAD_TO_DEG;
    snapshot.pitch_rate_deg_s = raw.pitch_rate_rad_s * RAD_TO_DEG;
    snapshot.yaw_rate_deg_s = raw.yaw_rate_rad_s * RAD_TO_DEG;
}

/// Extract the vertical coordinate as altitude
fn apply_position(snapshot: &mut FlightSnapshot, raw: PositionSample) {
    snapshot.altitude_m = raw.z_m;
}
