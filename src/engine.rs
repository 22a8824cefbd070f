//! The sensing engine.
//!
//! `SenseEngine` owns the calibrated reference snapshot and the operator
//! configuration. The reference is the only mutable state:
//!
//! - `calibrate` is the single writer. The new baseline is computed before
//!   the write lock is taken, so a failed calibration leaves the previous
//!   reference (or the uncalibrated state) untouched, and readers never
//!   observe a partially written baseline.
//! - `classify`/`assess` hold a read lock only for the comparison and may
//!   run in parallel from any number of threads.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::calibrate::baseline_mean;
use crate::classify::{Assessment, Classification, Thresholds};
use crate::error::SenseResult;
use crate::snapshot::Snapshot;

/// Construction-time options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    /// Informational to the engine: tells callers whether alerts should be
    /// acted upon.
    pub armed: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            armed: true,
        }
    }
}

#[derive(Debug)]
pub struct SenseEngine {
    config: EngineConfig,
    reference: RwLock<Option<Snapshot>>,
}

impl SenseEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            reference: RwLock::new(None),
        }
    }

    /// Engine with default thresholds and the given sensitivity.
    pub fn with_sensitivity(sensitivity: f64) -> SenseResult<Self> {
        Ok(Self::new(EngineConfig {
            thresholds: Thresholds::with_sensitivity(sensitivity)?,
            ..EngineConfig::default()
        }))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sensitivity(&self) -> f64 {
        self.config.thresholds.sensitivity()
    }

    pub fn is_armed(&self) -> bool {
        self.config.armed
    }

    pub fn is_calibrated(&self) -> bool {
        self.read_reference().is_some()
    }

    /// Copy of the current baseline, if any.
    pub fn reference(&self) -> Option<Snapshot> {
        self.read_reference().clone()
    }

    /// Replace the baseline with the element-wise mean of `samples`.
    ///
    /// Returns a copy of the new reference.
    pub fn calibrate(&self, samples: &[Snapshot]) -> SenseResult<Snapshot> {
        let baseline = baseline_mean(samples)?;
        *self.write_reference() = Some(baseline.clone());
        log::info!(
            "calibration successful: baseline set from {} samples over {} channels",
            samples.len(),
            baseline.len()
        );
        Ok(baseline)
    }

    /// Classify one live snapshot against the baseline.
    pub fn classify(&self, snapshot: &Snapshot) -> SenseResult<Classification> {
        Ok(self.assess(snapshot)?.classification)
    }

    /// Classify one live snapshot and report the deviation behind it.
    pub fn assess(&self, snapshot: &Snapshot) -> SenseResult<Assessment> {
        let guard = self.read_reference();
        let Some(reference) = guard.as_ref() else {
            return Ok(Assessment::not_ready());
        };
        let deviation = snapshot.distance_to(reference)?;
        drop(guard);

        let classification = self.config.thresholds.classify(deviation);
        log::trace!("deviation {:.4} -> {}", deviation, classification);
        Ok(Assessment {
            classification,
            deviation: Some(deviation),
        })
    }

    // The guarded value is only ever replaced whole, so a poisoned lock
    // still holds a consistent reference.
    fn read_reference(&self) -> RwLockReadGuard<'_, Option<Snapshot>> {
        self.reference
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_reference(&self) -> RwLockWriteGuard<'_, Option<Snapshot>> {
        self.reference
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SenseEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
