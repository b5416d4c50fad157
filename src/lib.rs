//! # Flight Params Library
//!
//! Bounded-wait acquisition of fundamental flight parameters from a telemetry bus.
//!
//! This library waits on independent telemetry channels (inertial+pressure,
//! attitude+rates, local position) with a single bounded timeout, fetches and
//! decodes whatever arrived fresh, and aggregates the results into one
//! caller-owned [`snapshot::FlightSnapshot`] with a per-cycle verdict.

pub mod aggregator;
pub mod bus;
pub mod config;
pub mod error;
pub mod registry;
pub mod snapshot;
