//! # Telemetry Bus Module
//!
//! Abstraction over the publish-subscribe telemetry transport.
//!
//! This module handles:
//! - Channel kinds (the closed set of topics this subsystem consumes)
//! - Opaque channel handles returned by subscription
//! - The `TelemetryBus` trait implemented by real and simulated transports
//! - Raw sample types delivered by the bus
//!
//! The bus itself (message encoding, driver plumbing, topic registration) is an
//! external collaborator; this crate only consumes the four operations below.

pub mod sample;
pub mod sim;

use async_trait::async_trait;
use std::io;
use tokio::time::Duration;

pub use sample::{AttitudeSample, InertialSample, PositionSample, RawSample};

/// The telemetry topics this subsystem subscribes to.
///
/// A closed set: one variant per independent telemetry source, each carrying its
/// own decode path in the aggregator. Readiness is always keyed by kind so one
/// channel's flag can never gate another source's fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Combined inertial sensor topic: 3-axis acceleration plus barometric pressure
    Inertial,
    /// Vehicle attitude topic: roll/pitch/yaw angles and angular rates, in radians
    Attitude,
    /// Local position topic: position relative to the reference origin
    Position,
}

impl ChannelKind {
    /// All channel kinds, in subscription order.
    pub const ALL: [ChannelKind; 3] = [
        ChannelKind::Inertial,
        ChannelKind::Attitude,
        ChannelKind::Position,
    ];

    /// Stable index of this kind within [`ChannelKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            ChannelKind::Inertial => 0,
            ChannelKind::Attitude => 1,
            ChannelKind::Position => 2,
        }
    }

    /// Topic name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ChannelKind::Inertial => "inertial",
            ChannelKind::Attitude => "attitude",
            ChannelKind::Position => "position",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque handle identifying one subscription on the bus.
///
/// Returned by [`TelemetryBus::subscribe`]; meaningful only to the bus that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelHandle(pub u32);

/// Trait for telemetry bus operations
///
/// Mirrors the external transport interface: subscribe, set the desired sample
/// interval, wait (bounded) for readiness, and fetch the latest sample.
///
/// Only [`wait_ready`](TelemetryBus::wait_ready) is async: it is the single
/// suspension point in the whole subsystem. Subscription and fetch are
/// non-blocking copies of bus-side state.
#[async_trait]
pub trait TelemetryBus: Send {
    /// Subscribe to a topic, returning an opaque channel handle
    fn subscribe(&mut self, kind: ChannelKind) -> io::Result<ChannelHandle>;

    /// Set the desired sample interval for a subscribed channel
    fn set_interval(&mut self, handle: ChannelHandle, interval: Duration) -> io::Result<()>;

    /// Wait until at least one of `handles` has fresh data or `timeout` elapses
    ///
    /// Returns one readiness flag per handle, in the same order as `handles`.
    /// A timeout with nothing ready returns all-false flags; an `Err` means the
    /// wait primitive itself failed (e.g. an invalid handle).
    async fn wait_ready(
        &mut self,
        handles: &[ChannelHandle],
        timeout: Duration,
    ) -> io::Result<Vec<bool>>;

    /// Copy the latest sample published on a channel
    fn fetch_latest(&mut self, kind: ChannelKind, handle: ChannelHandle) -> io::Result<RawSample>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock telemetry bus for testing
    ///
    /// Results for `wait_ready` and `fetch_latest` are scripted per call;
    /// subscriptions and interval settings are recorded for assertions.
    #[derive(Clone)]
    pub struct MockBus {
        pub subscriptions: Arc<Mutex<Vec<ChannelKind>>>,
        pub intervals: Arc<Mutex<Vec<(ChannelHandle, Duration)>>>,
        pub subscribe_error: Arc<Mutex<Option<ChannelKind>>>,
        pub set_interval_error: Arc<Mutex<Option<io::ErrorKind>>>,
        pub wait_results: Arc<Mutex<VecDeque<io::Result<Vec<bool>>>>>,
        pub fetch_results: Arc<Mutex<[VecDeque<io::Result<RawSample>>; 3]>>,
    }

    impl MockBus {
        pub fn new() -> Self {
            Self {
                subscriptions: Arc::new(Mutex::new(Vec::new())),
                intervals: Arc::new(Mutex::new(Vec::new())),
                subscribe_error: Arc::new(Mutex::new(None)),
                set_interval_error: Arc::new(Mutex::new(None)),
                wait_results: Arc::new(Mutex::new(VecDeque::new())),
                fetch_results: Arc::new(Mutex::new(Default::default())),
            }
        }

        /// Script the next `wait_ready` call to report these per-kind flags
        /// (indexed in `ChannelKind::ALL` order).
        pub fn push_wait_ready(&self, flags: [bool; 3]) {
            self.wait_results
                .lock()
                .unwrap()
                .push_back(Ok(flags.to_vec()));
        }

        /// Script the next `wait_ready` call to fail with the given error kind.
        pub fn push_wait_error(&self, error: io::ErrorKind) {
            self.wait_results
                .lock()
                .unwrap()
                .push_back(Err(io::Error::new(error, "mock wait error")));
        }

        /// Script the next `fetch_latest` for `kind` to deliver `sample`.
        pub fn push_sample(&self, kind: ChannelKind, sample: RawSample) {
            self.fetch_results.lock().unwrap()[kind.index()].push_back(Ok(sample));
        }

        /// Script the next `fetch_latest` for `kind` to fail.
        pub fn push_fetch_error(&self, kind: ChannelKind, error: io::ErrorKind) {
            self.fetch_results.lock().unwrap()[kind.index()]
                .push_back(Err(io::Error::new(error, "mock fetch error")));
        }

        pub fn fail_subscribe(&self, kind: ChannelKind) {
            *self.subscribe_error.lock().unwrap() = Some(kind);
        }

        pub fn recorded_subscriptions(&self) -> Vec<ChannelKind> {
            self.subscriptions.lock().unwrap().clone()
        }

        pub fn recorded_intervals(&self) -> Vec<(ChannelHandle, Duration)> {
            self.intervals.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TelemetryBus for MockBus {
        fn subscribe(&mut self, kind: ChannelKind) -> io::Result<ChannelHandle> {
            if *self.subscribe_error.lock().unwrap() == Some(kind) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("mock: no such topic {kind}"),
                ));
            }
            let mut subs = self.subscriptions.lock().unwrap();
            subs.push(kind);
            Ok(ChannelHandle(subs.len() as u32))
        }

        fn set_interval(&mut self, handle: ChannelHandle, interval: Duration) -> io::Result<()> {
            if let Some(error) = *self.set_interval_error.lock().unwrap() {
                return Err(io::Error::new(error, "mock set_interval error"));
            }
            self.intervals.lock().unwrap().push((handle, interval));
            Ok(())
        }

        async fn wait_ready(
            &mut self,
            handles: &[ChannelHandle],
            _timeout: Duration,
        ) -> io::Result<Vec<bool>> {
            match self.wait_results.lock().unwrap().pop_front() {
                Some(result) => result,
                // Unscripted wait behaves like a timeout with nothing ready
                None => Ok(vec![false; handles.len()]),
            }
        }

        fn fetch_latest(
            &mut self,
            kind: ChannelKind,
            _handle: ChannelHandle,
        ) -> io::Result<RawSample> {
            match self.fetch_results.lock().unwrap()[kind.index()].pop_front() {
                Some(result) => result,
                None => Err(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    format!("mock: no sample queued for {kind}"),
                )),
            }
        }
    }
}
