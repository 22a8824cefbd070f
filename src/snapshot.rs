//! Channel-state snapshots.
//!
//! A `Snapshot` is one measurement frame: one real value per channel or
//! subcarrier. Values are private and there is no mutable accessor, so a
//! snapshot cannot change after the acquisition layer hands it over.
//! Channel values are zeroized when the snapshot is dropped.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{SenseError, SenseResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    values: Vec<f64>,
}

impl Snapshot {
    /// Wrap a frame of channel values. Rejects zero-channel frames.
    pub fn new(values: Vec<f64>) -> SenseResult<Self> {
        if values.is_empty() {
            return Err(SenseError::EmptySnapshot);
        }
        Ok(Self { values })
    }

    /// Number of channels in this frame.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed snapshot; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Euclidean distance between two frames of the same length.
    pub fn distance_to(&self, other: &Snapshot) -> SenseResult<f64> {
        if self.len() != other.len() {
            return Err(SenseError::LengthMismatch {
                expected: other.len(),
                actual: self.len(),
            });
        }
        let sum_sq: f64 = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum();
        Ok(sum_sq.sqrt())
    }

    /// Append the canonical byte encoding used for fingerprinting:
    /// channel count (u64 LE) then each value's IEEE-754 bits (u64 LE).
    pub(crate) fn write_canonical(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.values.len() as u64).to_le_bytes());
        for v in &self.values {
            out.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }
}

impl Drop for Snapshot {
    fn drop(&mut self) {
        self.values.zeroize();
    }
}

impl ZeroizeOnDrop for Snapshot {}

impl TryFrom<Vec<f64>> for Snapshot {
    type Error = SenseError;

    fn try_from(values: Vec<f64>) -> SenseResult<Self> {
        Self::new(values)
    }
}

impl AsRef<[f64]> for Snapshot {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
