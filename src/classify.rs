//! Tiered state classification.
//!
//! A deviation (Euclidean distance from the calibrated baseline) is mapped
//! onto three tiers:
//!
//! | deviation                      | state            |
//! |--------------------------------|------------------|
//! | `d < idle_threshold`           | `Idle`           |
//! | `idle_threshold <= d < sens`   | `BioPresence`    |
//! | `d >= sens`                    | `IntrusionAlert` |
//!
//! The lower bound of each tier is inclusive. When the sensitivity does not
//! exceed the idle threshold the presence band is empty: anything at or
//! above the sensitivity is an intrusion and everything else is idle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SenseError, SenseResult};

/// Deviation below which the room is considered quiescent.
pub const DEFAULT_IDLE_THRESHOLD: f64 = 0.1;

/// Deviation at and above which movement is treated as an intrusion.
pub const DEFAULT_SENSITIVITY: f64 = 0.75;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// No baseline has been calibrated yet.
    NotReady,
    /// Room quiescent.
    Idle,
    /// Breathing or micro-movement.
    BioPresence,
    /// Strong movement.
    IntrusionAlert,
}

impl Classification {
    /// Stable wire label.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::NotReady => "SYSTEM_NOT_READY",
            Classification::Idle => "STATE_IDLE",
            Classification::BioPresence => "STATE_BIO_PRESENCE",
            Classification::IntrusionAlert => "STATE_INTRUSION_ALERT",
        }
    }

    pub const ALL: [Classification; 4] = [
        Classification::NotReady,
        Classification::Idle,
        Classification::BioPresence,
        Classification::IntrusionAlert,
    ];
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fixed operator thresholds. Construct through [`Thresholds::new`] so both
/// bounds are positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    idle: f64,
    sensitivity: f64,
}

impl Thresholds {
    pub fn new(idle: f64, sensitivity: f64) -> SenseResult<Self> {
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(SenseError::InvalidSensitivity(sensitivity));
        }
        if !idle.is_finite() || idle <= 0.0 {
            return Err(SenseError::InvalidIdleThreshold(idle));
        }
        Ok(Self { idle, sensitivity })
    }

    /// Default idle threshold with a custom sensitivity.
    pub fn with_sensitivity(sensitivity: f64) -> SenseResult<Self> {
        Self::new(DEFAULT_IDLE_THRESHOLD, sensitivity)
    }

    pub fn idle(&self) -> f64 {
        self.idle
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Map a deviation to its tier. Never returns `NotReady`.
    pub fn classify(&self, deviation: f64) -> Classification {
        if deviation >= self.sensitivity {
            Classification::IntrusionAlert
        } else if deviation < self.idle {
            Classification::Idle
        } else {
            Classification::BioPresence
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            idle: DEFAULT_IDLE_THRESHOLD,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

/// Classification of one snapshot together with the deviation behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Assessment {
    pub classification: Classification,
    /// `None` when the engine was not calibrated.
    pub deviation: Option<f64>,
}

impl Assessment {
    pub fn not_ready() -> Self {
        Self {
            classification: Classification::NotReady,
            deviation: None,
        }
    }
}
