//! # Simulated Telemetry Bus
//!
//! Deterministic in-process bus used by the binary to run the full acquisition
//! loop without flight hardware, standing in for the driver stack that feeds
//! the real bus on the vehicle.
//!
//! Samples are synthesized from a tick counter: smooth waveforms for attitude
//! and acceleration, a slow altitude oscillation, and pressure derived from
//! altitude. Every [`ATTITUDE_DROPOUT_EVERY`]-th publish the attitude channel
//! withholds readiness so the partial-failure path is exercised end to end.

use super::sample::{AttitudeSample, InertialSample, PositionSample};
use super::{ChannelHandle, ChannelKind, RawSample, TelemetryBus};
use async_trait::async_trait;
use std::io;
use tokio::time::{sleep, Duration};
use tracing::debug;

/// Default period between simulated publishes
pub const SIM_PUBLISH_PERIOD: Duration = Duration::from_millis(50);

/// The attitude channel skips readiness on every Nth publish
pub const ATTITUDE_DROPOUT_EVERY: u64 = 8;

/// Standard sea-level pressure in millibar
const SEA_LEVEL_PRESSURE_MBAR: f32 = 1013.25;

/// Pressure lapse per meter of altitude, in millibar (near sea level)
const PRESSURE_LAPSE_MBAR_PER_M: f32 = 0.12;

/// Simulated telemetry bus
///
/// Implements [`TelemetryBus`] with synthetic, fully deterministic samples.
/// One waiting consumer is assumed (the registry); each `wait_ready` spans one
/// publish period of simulated time.
pub struct SimBus {
    /// Period between publishes of fresh samples
    publish_period: Duration,
    /// Number of publishes so far; drives the waveforms
    tick: u64,
    /// Subscriptions in the order they were established
    channels: Vec<(ChannelHandle, ChannelKind)>,
}

impl SimBus {
    /// Create a simulated bus publishing fresh samples every `publish_period`
    pub fn new(publish_period: Duration) -> Self {
        Self {
            publish_period,
            tick: 0,
            channels: Vec::new(),
        }
    }

    /// Simulated time in seconds at the current tick
    fn sim_time(&self) -> f32 {
        self.tick as f32 * self.publish_period.as_secs_f32()
    }

    fn altitude_m(&self) -> f32 {
        50.0 + 10.0 * (0.05 * self.sim_time()).sin()
    }

    fn inertial_sample(&self) -> InertialSample {
        let t = self.sim_time();
        InertialSample {
            accel_m_s2: [
                0.4 * (0.5 * t).sin(),
                0.3 * (0.7 * t).cos(),
                -9.81 + 0.05 * (2.0 * t).sin(),
            ],
            baro_pressure_mbar: SEA_LEVEL_PRESSURE_MBAR
                - PRESSURE_LAPSE_MBAR_PER_M * self.altitude_m(),
        }
    }

    fn attitude_sample(&self) -> AttitudeSample {
        let t = self.sim_time();
        // Rates are the analytic derivatives of the angle waveforms
        AttitudeSample {
            roll_rad: 0.10 * (0.8 * t).sin(),
            pitch_rad: 0.05 * (0.6 * t).sin(),
            yaw_rad: 0.20 * (0.1 * t).sin(),
            roll_rate_rad_s: 0.10 * 0.8 * (0.8 * t).cos(),
            pitch_rate_rad_s: 0.05 * 0.6 * (0.6 * t).cos(),
            yaw_rate_rad_s: 0.20 * 0.1 * (0.1 * t).cos(),
        }
    }

    fn position_sample(&self) -> PositionSample {
        let t = self.sim_time();
        PositionSample {
            x_m: 4.0 * t,
            y_m: 0.5 * (0.2 * t).sin(),
            z_m: self.altitude_m(),
        }
    }

    fn kind_of(&self, handle: ChannelHandle) -> Option<ChannelKind> {
        self.channels
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, kind)| *kind)
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new(SIM_PUBLISH_PERIOD)
    }
}

#[async_trait]
impl TelemetryBus for SimBus {
    fn subscribe(&mut self, kind: ChannelKind) -> io::Result<ChannelHandle> {
        let handle = ChannelHandle(self.channels.len() as u32 + 1);
        self.channels.push((handle, kind));
        debug!("sim bus: subscribed {} as handle {:?}", kind, handle);
        Ok(handle)
    }

    fn set_interval(&mut self, handle: ChannelHandle, _interval: Duration) -> io::Result<()> {
        // The sim publishes at its own fixed period; the request only needs a
        // valid handle
        if self.kind_of(handle).is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("sim bus: unknown handle {handle:?}"),
            ));
        }
        Ok(())
    }

    async fn wait_ready(
        &mut self,
        handles: &[ChannelHandle],
        timeout: Duration,
    ) -> io::Result<Vec<bool>> {
        for handle in handles {
            if self.kind_of(*handle).is_none() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("sim bus: unknown handle {handle:?}"),
                ));
            }
        }

        if self.publish_period > timeout {
            // Next publish lands outside the wait window
            sleep(timeout).await;
            return Ok(vec![false; handles.len()]);
        }

        sleep(self.publish_period).await;
        self.tick += 1;

        let flags = handles
            .iter()
            .map(|handle| {
                let kind = self.kind_of(*handle).unwrap_or(ChannelKind::Inertial);
                !(kind == ChannelKind::Attitude && self.tick % ATTITUDE_DROPOUT_EVERY == 0)
            })
            .collect();
        Ok(flags)
    }

    fn fetch_latest(&mut self, kind: ChannelKind, handle: ChannelHandle) -> io::Result<RawSample> {
        match self.kind_of(handle) {
            Some(subscribed) if subscribed == kind => {}
            Some(subscribed) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("sim bus: handle {handle:?} is {subscribed}, not {kind}"),
                ));
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("sim bus: unknown handle {handle:?}"),
                ));
            }
        }

        let sample = match kind {
            ChannelKind::Inertial => RawSample::Inertial(self.inertial_sample()),
            ChannelKind::Attitude => RawSample::Attitude(self.attitude_sample()),
            ChannelKind::Position => RawSample::Position(self.position_sample()),
        };
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Short publish period keeps the real sleeps in these tests negligible
    const TEST_PERIOD: Duration = Duration::from_millis(5);

    fn subscribed_bus() -> (SimBus, Vec<ChannelHandle>) {
        let mut bus = SimBus::new(TEST_PERIOD);
        let handles = ChannelKind::ALL
            .iter()
            .map(|kind| bus.subscribe(*kind).unwrap())
            .collect();
        (bus, handles)
    }

    #[tokio::test]
    async fn test_wait_reports_all_ready_after_one_publish() {
        let (mut bus, handles) = subscribed_bus();
        let flags = bus
            .wait_ready(&handles, Duration::from_millis(200))
            .await
            .unwrap();
        assert_eq!(flags, vec![true, true, true]);
    }

    #[tokio::test]
    async fn test_wait_times_out_when_publish_period_exceeds_window() {
        let mut bus = SimBus::new(Duration::from_millis(50));
        let handles = vec![bus.subscribe(ChannelKind::Inertial).unwrap()];

        let flags = bus
            .wait_ready(&handles, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(flags, vec![false], "no publish fits a 10ms window");
    }

    #[tokio::test]
    async fn test_attitude_drops_out_periodically() {
        let (mut bus, handles) = subscribed_bus();

        for tick in 1..=ATTITUDE_DROPOUT_EVERY {
            let flags = bus
                .wait_ready(&handles, Duration::from_millis(200))
                .await
                .unwrap();
            let attitude_ready = flags[ChannelKind::Attitude.index()];
            if tick == ATTITUDE_DROPOUT_EVERY {
                assert!(!attitude_ready, "attitude should drop out on tick {tick}");
            } else {
                assert!(attitude_ready, "attitude should be ready on tick {tick}");
            }
            // The other channels never drop out
            assert!(flags[ChannelKind::Inertial.index()]);
            assert!(flags[ChannelKind::Position.index()]);
        }
    }

    #[tokio::test]
    async fn test_fetch_latest_returns_matching_kind() {
        let (mut bus, handles) = subscribed_bus();
        bus.wait_ready(&handles, Duration::from_millis(200))
            .await
            .unwrap();

        for (i, kind) in ChannelKind::ALL.iter().enumerate() {
            let sample = bus.fetch_latest(*kind, handles[i]).unwrap();
            assert_eq!(sample.kind(), *kind);
        }
    }

    #[test]
    fn test_fetch_latest_rejects_mismatched_handle() {
        let (mut bus, handles) = subscribed_bus();

        // Attitude handle queried as inertial
        let result = bus.fetch_latest(ChannelKind::Inertial, handles[1]);
        assert!(result.is_err(), "kind/handle mismatch should be rejected");
    }

    #[test]
    fn test_default_publish_period() {
        let bus = SimBus::default();
        assert_eq!(bus.publish_period, SIM_PUBLISH_PERIOD);
    }

    #[test]
    fn test_pressure_tracks_altitude() {
        let bus = SimBus::default();
        let sample = bus.inertial_sample();
        let expected =
            SEA_LEVEL_PRESSURE_MBAR - PRESSURE_LAPSE_MBAR_PER_M * bus.altitude_m();
        assert!((sample.baro_pressure_mbar - expected).abs() < 1e-4);
    }
}
