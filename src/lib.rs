//! OmniSense
//!
//! Classifies the momentary state of a monitored space from Wi-Fi
//! channel-state snapshots by comparing each one against an empty-room
//! baseline, and derives short identity tokens from gait segments.
//!
//! # Architecture
//!
//! - **Calibrator** (`calibrate`): element-wise mean of empty-room snapshots.
//! - **Classifier** (`classify`, `engine`): Euclidean deviation from the
//!   baseline, mapped onto `Idle` / `BioPresence` / `IntrusionAlert`.
//! - **Fingerprinter** (`gait`): SHA-256 over a canonical encoding of a
//!   snapshot segment, truncated to an `ID-XXXXXXXX` token.
//!
//! The engine keeps exactly one piece of mutable state, the reference
//! snapshot, behind a reader/writer lock: calibration writes it, classification
//! reads it, fingerprinting never touches it.
//!
//! # Module Structure
//!
//! - `snapshot`: immutable channel-state frames
//! - `engine`: `SenseEngine`, the long-lived calibrate/classify owner
//! - `gait`: identity tokens and the bounded `GaitWindow`
//! - `config`: file + environment configuration for the harness
//! - `ingest`: synthetic and file-replay snapshot sources

pub mod calibrate;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod gait;
pub mod ingest;
pub mod snapshot;

pub use calibrate::baseline_mean;
pub use classify::{
    Assessment, Classification, Thresholds, DEFAULT_IDLE_THRESHOLD, DEFAULT_SENSITIVITY,
};
pub use config::OmnisenseConfig;
pub use engine::{EngineConfig, SenseEngine};
pub use error::{SenseError, SenseResult};
pub use gait::{identify, GaitWindow, IdentityToken, DEFAULT_GAIT_WINDOW, TOKEN_PREFIX};
pub use ingest::{SnapshotSource, SourceConfig, SourceStats};
pub use snapshot::Snapshot;
