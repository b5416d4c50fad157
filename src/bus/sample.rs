//! # Raw Sample Types
//!
//! The sample structs delivered by the telemetry bus, one per channel kind.
//!
//! These carry raw sensor units as published by the drivers; unit conversion
//! into the snapshot's engineering units happens in the aggregator.

use super::ChannelKind;

/// Combined inertial sensor sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InertialSample {
    /// Body-frame acceleration \[x, y, z\] in m/s²
    pub accel_m_s2: [f32; 3],

    /// Barometric pressure in millibar
    pub baro_pressure_mbar: f32,
}

/// Vehicle attitude sample, angles and rates in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttitudeSample {
    /// Roll angle in radians
    pub roll_rad: f32,

    /// Pitch angle in radians
    pub pitch_rad: f32,

    /// Yaw angle in radians
    pub yaw_rad: f32,

    /// Roll rate in radians/second
    pub roll_rate_rad_s: f32,

    /// Pitch rate in radians/second
    pub pitch_rate_rad_s: f32,

    /// Yaw rate in radians/second
    pub yaw_rate_rad_s: f32,
}

/// Local position sample, relative to the reference origin
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionSample {
    /// Horizontal position x in meters
    pub x_m: f32,

    /// Horizontal position y in meters
    pub y_m: f32,

    /// Vertical coordinate in meters; read out as altitude
    pub z_m: f32,
}

/// One sample as delivered by the bus, tagged by channel kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSample {
    Inertial(InertialSample),
    Attitude(AttitudeSample),
    Position(PositionSample),
}

impl RawSample {
    /// The channel kind this sample belongs to
    pub fn kind(&self) -> ChannelKind {
        match self {
            RawSample::Inertial(_) => ChannelKind::Inertial,
            RawSample::Attitude(_) => ChannelKind::Attitude,
            RawSample::Position(_) => ChannelKind::Position,
        }
    }
}
