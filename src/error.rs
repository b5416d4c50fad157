//! # Error Types
//!
//! Custom error types for flight-params using `thiserror`.

use thiserror::Error;

/// Main error type for flight-params
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Channel subscription setup failed (fatal, caller must abort startup)
    #[error("channel subscription failed: {0}")]
    Init(String),

    /// Bounded wait elapsed with no channel ready (cycle-fatal, retry next cycle)
    #[error("no fresh telemetry within the wait window")]
    NoData,

    /// The underlying wait primitive failed (cycle-fatal, retry next cycle)
    #[error("telemetry bus wait failed: {0}")]
    Wait(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for flight-params
pub type Result<T> = std::result::Result<T, AcquireError>;
