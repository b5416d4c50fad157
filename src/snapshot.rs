//! # Flight Snapshot Module
//!
//! The aggregated flight-parameter record and its read accessors.
//!
//! The snapshot is owned by the caller: allocated once before the first
//! acquisition cycle, then handed to the aggregator by mutable reference each
//! cycle. A field always holds the most recently decoded value for its source;
//! when a source delivers nothing in a cycle, its fields keep their prior
//! values (stale-but-valid retention). No internal locking: read accessors
//! must be called from the task that runs the acquisition cycle, or under an
//! external lock.

/// Sentinel returned by [`FlightSnapshot::pressure`] when the stored value is
/// outside the physical domain (pressure cannot be negative).
pub const PRESSURE_OUT_OF_RANGE: f32 = -1.0;

/// Aggregated record of the latest known flight parameters
///
/// All values are in SI/engineering units: pressure in millibar, angles in
/// degrees, rates in degrees/second, acceleration in m/s², altitude in meters
/// relative to the reference origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightSnapshot {
    pub(crate) pressure_mbar: f32,
    pub(crate) pitch_rate_deg_s: f32,
    pub(crate) roll_rate_deg_s: f32,
    pub(crate) yaw_rate_deg_s: f32,
    pub(crate) pitch_deg: f32,
    pub(crate) roll_deg: f32,
    pub(crate) yaw_deg: f32,
    pub(crate) accel_x_m_s2: f32,
    pub(crate) accel_y_m_s2: f32,
    pub(crate) accel_z_m_s2: f32,
    pub(crate) altitude_m: f32,
}

impl FlightSnapshot {
    /// Allocate a zeroed snapshot
    ///
    /// Call once before the first acquisition cycle and keep it alive for the
    /// life of the process; the aggregator updates it in place.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Barometric pressure in millibar
    ///
    /// A stored value below zero is outside the physical domain and is
    /// reported as [`PRESSURE_OUT_OF_RANGE`] instead of the raw value.
    pub fn pressure(&self) -> f32 {
        if self.pressure_mbar < 0.0 {
            return PRESSURE_OUT_OF_RANGE;
        }
        self.pressure_mbar
    }

    /// Pitch rate in degrees/second
    pub fn pitch_rate(&self) -> f32 {
        self.pitch_rate_deg_s
    }

    /// Roll rate in degrees/second
    pub fn roll_rate(&self) -> f32 {
        self.roll_rate_deg_s
    }

    /// Yaw rate in degrees/second
    pub fn yaw_rate(&self) -> f32 {
        self.yaw_rate_deg_s
    }

    /// Pitch angle in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch_deg
    }

    /// Roll angle in degrees
    pub fn roll(&self) -> f32 {
        self.roll_deg
    }

    /// Yaw angle in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw_deg
    }

    /// Acceleration along the x axis in m/s²
    pub fn accel_x(&self) -> f32 {
        self.accel_x_m_s2
    }

    /// Acceleration along the y axis in m/s²
    pub fn accel_y(&self) -> f32 {
        self.accel_y_m_s2
    }

    /// Acceleration along the z axis in m/s²
    pub fn accel_z(&self) -> f32 {
        self.accel_z_m_s2
    }

    /// Altitude in meters relative to the reference origin
    pub fn altitude(&self) -> f32 {
        self.altitude_m
    }
}
