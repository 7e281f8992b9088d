// rov_core/src/error.rs

use thiserror::Error;

/// Why a sensor sample was dropped before reaching the estimator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SampleError {
    #[error("sample timestamp {timestamp} precedes last update at {last}")]
    TimestampRollback { timestamp: f64, last: f64 },

    #[error("sample contains a NaN or infinite component")]
    NonFinite,
}

/// A parameter or configuration value the core refuses to run with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("gain '{name}' must be non-negative and finite, got {value}")]
    InvalidGain { name: &'static str, value: f64 },

    #[error("weight '{name}' is invalid: {reason}")]
    InvalidWeight { name: &'static str, reason: String },

    #[error("Riccati solve is singular: R + B'PB is not invertible")]
    SingularRiccati,

    #[error("Riccati iteration did not converge after {iterations} iterations")]
    RiccatiDiverged { iterations: usize },

    #[error("{what}: expected {expected} entries, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid value for '{name}': {reason}")]
    OutOfRange { name: &'static str, reason: String },
}

/// The actuation collaborator rejected or failed a write.
#[derive(Debug, Error)]
pub enum ActuationError {
    #[error("actuation sink rejected command: {0}")]
    Rejected(String),

    #[error("expected {expected} thruster channels, sink drives {found}")]
    ChannelMismatch { expected: usize, found: usize },

    #[error("actuation I/O failure")]
    Io(#[from] std::io::Error),
}

/// Umbrella error for callers that handle every core failure the same way.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sample: {0}")]
    InvalidSample(#[from] SampleError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),

    #[error("actuation write failed: {0}")]
    ActuationWriteFailure(#[from] ActuationError),
}
