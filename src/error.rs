//! Error types for the sensing core.
//!
//! Only precondition violations are errors. An engine that has not been
//! calibrated yet is an expected condition and is reported as
//! [`Classification::NotReady`](crate::Classification::NotReady) instead.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type SenseResult<T> = Result<T, SenseError>;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SenseError {
    /// Calibration was attempted with zero samples.
    #[error("calibration requires at least one sample")]
    EmptyCalibration,

    /// A calibration sample disagrees in length with the first sample.
    #[error("calibration sample {index} has {actual} channels, expected {expected}")]
    RaggedCalibration {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// A live snapshot disagrees in length with the reference snapshot.
    #[error("snapshot has {actual} channels but the reference has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A snapshot must carry at least one channel.
    #[error("snapshot must contain at least one channel")]
    EmptySnapshot,

    #[error("sensitivity must be a positive finite number, got {0}")]
    InvalidSensitivity(f64),

    #[error("idle threshold must be a positive finite number, got {0}")]
    InvalidIdleThreshold(f64),

    #[error("gait window capacity must be at least one snapshot")]
    InvalidWindow,
}
