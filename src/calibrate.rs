//! Baseline calibration.
//!
//! Reduces a batch of empty-room snapshots to one reference snapshot by
//! taking the arithmetic mean of every channel across the batch.

use crate::error::{SenseError, SenseResult};
use crate::snapshot::Snapshot;

/// Element-wise mean of `samples`.
///
/// Fails on an empty batch (the mean would be undefined) and on a batch
/// whose samples disagree in length.
pub fn baseline_mean(samples: &[Snapshot]) -> SenseResult<Snapshot> {
    let first = samples.first().ok_or(SenseError::EmptyCalibration)?;
    let channels = first.len();

    let mut sums = vec![0.0f64; channels];
    for (index, sample) in samples.iter().enumerate() {
        if sample.len() != channels {
            return Err(SenseError::RaggedCalibration {
                index,
                expected: channels,
                actual: sample.len(),
            });
        }
        for (acc, v) in sums.iter_mut().zip(sample.values()) {
            *acc += v;
        }
    }

    let n = samples.len() as f64;
    for acc in &mut sums {
        *acc /= n;
    }
    Snapshot::new(sums)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(values: &[f64]) -> Snapshot {
        Snapshot::new(values.to_vec()).unwrap()
    }

    #[test]
    fn mean_of_identical_samples_is_the_sample() {
        let samples = vec![snap(&[1.0, 1.0]), snap(&[1.0, 1.0]), snap(&[1.0, 1.0])];
        assert_eq!(baseline_mean(&samples).unwrap(), snap(&[1.0, 1.0]));
    }

    #[test]
    fn mean_is_per_channel() {
        let samples = vec![snap(&[0.0, 2.0, 4.0]), snap(&[2.0, 4.0, 8.0])];
        assert_eq!(baseline_mean(&samples).unwrap(), snap(&[1.0, 3.0, 6.0]));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(baseline_mean(&[]), Err(SenseError::EmptyCalibration));
    }

    #[test]
    fn ragged_batch_names_the_offending_sample() {
        let samples = vec![snap(&[1.0, 1.0]), snap(&[1.0, 1.0]), snap(&[1.0])];
        assert_eq!(
            baseline_mean(&samples),
            Err(SenseError::RaggedCalibration {
                index: 2,
                expected: 2,
                actual: 1
            })
        );
    }
}
