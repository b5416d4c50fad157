//! # Channel Registry Module
//!
//! Owns the subscribed channel handles and their readiness-wait configuration.
//!
//! The registry establishes all subscriptions once at startup and exposes one
//! bounded wait call reporting which channels have fresh data. Subscription
//! state lives in this value (constructed once, injected into the aggregator)
//! rather than in process-wide globals, and readiness is keyed by channel kind
//! so one channel's flag can never gate another source's fetch.

use crate::bus::{ChannelHandle, ChannelKind, RawSample, TelemetryBus};
use crate::error::{AcquireError, Result};
use std::io;
use tokio::time::Duration;
use tracing::{debug, info, warn};

/// Number of subscribed channels
pub const CHANNEL_COUNT: usize = ChannelKind::ALL.len();

/// Desired sample interval requested for every channel (100ms cadence)
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// One subscribed telemetry channel
///
/// Pairs a kind with the opaque handle the bus issued for it. Created during
/// [`ChannelRegistry::initialize`] and kept for the process lifetime.
#[derive(Debug, Clone, Copy)]
pub struct Channel {
    kind: ChannelKind,
    handle: ChannelHandle,
}

impl Channel {
    /// The channel's kind
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// The opaque bus handle for this channel
    pub fn handle(&self) -> ChannelHandle {
        self.handle
    }
}

/// Per-channel readiness flags for one wait window, keyed by [`ChannelKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadySet {
    flags: [bool; CHANNEL_COUNT],
}

impl ReadySet {
    /// Whether the channel of this kind reported fresh data
    pub fn is_ready(&self, kind: ChannelKind) -> bool {
        self.flags[kind.index()]
    }

    /// Whether any channel reported fresh data
    pub fn any(&self) -> bool {
        self.flags.iter().any(|ready| *ready)
    }

    /// Number of channels that reported fresh data
    pub fn ready_count(&self) -> usize {
        self.flags.iter().filter(|ready| **ready).count()
    }

    fn mark(&mut self, kind: ChannelKind) {
        self.flags[kind.index()] = true;
    }
}

/// Registry of subscribed telemetry channels
///
/// Leaf component: owns the bus connection and the channel handles. The
/// aggregator calls [`wait_for_data`](ChannelRegistry::wait_for_data) once per
/// cycle, then [`fetch_latest`](ChannelRegistry::fetch_latest) for each ready
/// kind.
pub struct ChannelRegistry<B: TelemetryBus> {
    bus: B,
    channels: [Channel; CHANNEL_COUNT],
}

impl<B: TelemetryBus> std::fmt::Debug for ChannelRegistry<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl<B: TelemetryBus> ChannelRegistry<B> {
    /// Subscribe to all channel kinds and set each desired sample interval
    ///
    /// Must be called exactly once per process lifetime. Subscriptions that
    /// succeeded before a failure are not rolled back, so a failed initialize
    /// must not be retried: treat [`AcquireError::Init`] as fatal and abort
    /// startup.
    ///
    /// # Errors
    ///
    /// Returns [`AcquireError::Init`] if any subscription or interval request
    /// is rejected by the bus.
    pub fn initialize(bus: B, sample_interval: Duration) -> Result<Self> {
        Self::initialize_inner(bus, sample_interval).map_err(|(kind, e)| {
            AcquireError::Init(format!("{kind} channel: {e}"))
        })
    }

    fn initialize_inner(
        mut bus: B,
        sample_interval: Duration,
    ) -> std::result::Result<Self, (ChannelKind, io::Error)> {
        let mut channels = [Channel {
            kind: ChannelKind::Inertial,
            handle: ChannelHandle(0),
        }; CHANNEL_COUNT];

        for kind in ChannelKind::ALL {
            let handle = bus.subscribe(kind).map_err(|e| (kind, e))?;
            bus.set_interval(handle, sample_interval)
                .map_err(|e| (kind, e))?;
            channels[kind.index()] = Channel { kind, handle };
            debug!("subscribed {} channel as {:?}", kind, handle);
        }

        info!(
            "telemetry subscriptions established ({} channels, {:?} cadence)",
            CHANNEL_COUNT, sample_interval
        );
        Ok(Self { bus, channels })
    }

    /// The subscribed channels, in [`ChannelKind::ALL`] order
    pub fn channels(&self) -> &[Channel; CHANNEL_COUNT] {
        &self.channels
    }

    /// Wait until at least one channel has fresh data or `timeout` elapses
    ///
    /// The single suspension point of the subsystem: suspends the calling task
    /// for at most `timeout`, then always returns.
    ///
    /// # Errors
    ///
    /// - [`AcquireError::NoData`]: the window elapsed with zero channels ready
    /// - [`AcquireError::Wait`]: the wait primitive itself failed
    pub async fn wait_for_data(&mut self, timeout: Duration) -> Result<ReadySet> {
        let handles: Vec<ChannelHandle> =
            self.channels.iter().map(|channel| channel.handle).collect();

        let flags = match self.bus.wait_ready(&handles, timeout).await {
            Ok(flags) => flags,
            Err(e) => {
                warn!("telemetry bus wait failed: {}", e);
                return Err(AcquireError::Wait(e.to_string()));
            }
        };

        if flags.len() != CHANNEL_COUNT {
            warn!(
                "telemetry bus returned {} readiness flags for {} channels",
                flags.len(),
                CHANNEL_COUNT
            );
            return Err(AcquireError::Wait(format!(
                "readiness vector has {} entries, expected {}",
                flags.len(),
                CHANNEL_COUNT
            )));
        }

        let mut ready = ReadySet::default();
        for (channel, flag) in self.channels.iter().zip(flags) {
            if flag {
                ready.mark(channel.kind);
            }
        }

        if !ready.any() {
            warn!("no fresh telemetry within {:?}", timeout);
            return Err(AcquireError::NoData);
        }

        debug!("{}/{} channels ready", ready.ready_count(), CHANNEL_COUNT);
        Ok(ready)
    }

    /// Copy the latest sample for the channel of this kind
    ///
    /// Looks up the channel's own handle, so a fetch can never go through
    /// another source's subscription.
    pub fn fetch_latest(&mut self, kind: ChannelKind) -> io::Result<RawSample> {
        let handle = self.channels[kind.index()].handle;
        self.bus.fetch_latest(kind, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::mocks::MockBus;
    use std::io::ErrorKind;

    #[test]
    fn test_initialize_subscribes_all_kinds_at_fixed_cadence() {
        let bus = MockBus::new();
        let recorder = bus.clone();

        let registry = ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL)
            .expect("initialize should succeed");

        assert_eq!(
            recorder.recorded_subscriptions(),
            ChannelKind::ALL.to_vec(),
            "all three kinds should be subscribed, in order"
        );

        let intervals = recorder.recorded_intervals();
        assert_eq!(intervals.len(), CHANNEL_COUNT);
        for (_, interval) in intervals {
            assert_eq!(interval, Duration::from_millis(100));
        }

        // Each channel maps to its own handle
        let channels = registry.channels();
        for kind in ChannelKind::ALL {
            assert_eq!(channels[kind.index()].kind(), kind);
        }
        assert_ne!(
            channels[0].handle(),
            channels[1].handle(),
            "handles must be distinct per channel"
        );
    }

    #[test]
    fn test_initialize_fails_when_a_subscription_is_rejected() {
        let bus = MockBus::new();
        bus.fail_subscribe(ChannelKind::Attitude);

        let result = ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL);
        match result {
            Err(AcquireError::Init(msg)) => {
                assert!(msg.contains("attitude"), "error should name the channel: {msg}");
            }
            other => panic!("Expected Init error, got: {other:?}"),
        }
    }

    #[test]
    fn test_initialize_fails_when_interval_is_rejected() {
        let bus = MockBus::new();
        *bus.set_interval_error.lock().unwrap() = Some(ErrorKind::InvalidInput);

        let result = ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL);
        assert!(matches!(result, Err(AcquireError::Init(_))));
    }

    #[tokio::test]
    async fn test_wait_maps_all_false_flags_to_no_data() {
        let bus = MockBus::new();
        bus.push_wait_ready([false, false, false]);

        let mut registry =
            ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL).unwrap();
        let result = registry.wait_for_data(Duration::from_millis(200)).await;
        assert!(matches!(result, Err(AcquireError::NoData)));
    }

    #[tokio::test]
    async fn test_wait_maps_bus_failure_to_wait_error() {
        let bus = MockBus::new();
        bus.push_wait_error(ErrorKind::InvalidInput);

        let mut registry =
            ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL).unwrap();
        let result = registry.wait_for_data(Duration::from_millis(200)).await;
        assert!(matches!(result, Err(AcquireError::Wait(_))));
    }

    #[tokio::test]
    async fn test_wait_reports_readiness_per_kind() {
        let bus = MockBus::new();
        bus.push_wait_ready([true, false, true]);

        let mut registry =
            ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL).unwrap();
        let ready = registry
            .wait_for_data(Duration::from_millis(200))
            .await
            .unwrap();

        assert!(ready.is_ready(ChannelKind::Inertial));
        assert!(!ready.is_ready(ChannelKind::Attitude));
        assert!(ready.is_ready(ChannelKind::Position));
        assert_eq!(ready.ready_count(), 2);
    }

    #[tokio::test]
    async fn test_wait_rejects_short_readiness_vector() {
        let bus = MockBus::new();
        bus.wait_results
            .lock()
            .unwrap()
            .push_back(Ok(vec![true, true]));

        let mut registry =
            ChannelRegistry::initialize(bus, DEFAULT_SAMPLE_INTERVAL).unwrap();
        let result = registry.wait_for_data(Duration::from_millis(200)).await;
        assert!(matches!(result, Err(AcquireError::Wait(_))));
    }
}
