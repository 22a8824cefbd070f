//! Gait fingerprinting.
//!
//! A gait segment (an ordered run of snapshots covering one person's
//! movement) is reduced to a short identity token:
//!
//! 1. encode the segment canonically (snapshot count, then each snapshot's
//!    channel count and IEEE-754 value bits, all u64 little-endian);
//! 2. SHA-256 the encoding;
//! 3. keep the first 4 bytes as uppercase hex behind the `ID-` marker.
//!
//! The token depends on nothing but the segment bytes, so the same segment
//! always yields the same token. Truncation to 32 bits means distinct
//! segments can collide; tokens are for distinguishing, not for proof.
//!
//! `GaitWindow` is the bounded buffer live snapshots accumulate in before
//! they are fingerprinted. Buffered values are zeroized when they leave the
//! window so raw movement data does not linger in memory.

use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use std::fmt;

use crate::error::{SenseError, SenseResult};
use crate::snapshot::Snapshot;

pub const TOKEN_PREFIX: &str = "ID-";

/// Number of digest bytes kept in a token (8 hex characters).
const TOKEN_BYTES: usize = 4;

/// Default window capacity: 3.2 s of history at 10 Hz.
pub const DEFAULT_GAIT_WINDOW: usize = 32;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex part of the token, without the marker.
    pub fn hex(&self) -> &str {
        &self.0[TOKEN_PREFIX.len()..]
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for IdentityToken {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Fingerprint a gait segment.
pub fn identify<'a, I>(segment: I) -> IdentityToken
where
    I: IntoIterator<Item = &'a Snapshot>,
    I::IntoIter: ExactSizeIterator,
{
    let segment = segment.into_iter();
    let mut canonical = Vec::new();
    canonical.extend_from_slice(&(segment.len() as u64).to_le_bytes());
    for snapshot in segment {
        snapshot.write_canonical(&mut canonical);
    }

    let digest = Sha256::digest(&canonical);
    let token = format!(
        "{}{}",
        TOKEN_PREFIX,
        hex::encode_upper(&digest[..TOKEN_BYTES])
    );
    IdentityToken(token)
}

/// Fixed-capacity ring buffer of recent snapshots, oldest first.
#[derive(Debug)]
pub struct GaitWindow {
    buffer: VecDeque<Snapshot>,
    capacity: usize,
}

impl GaitWindow {
    pub fn new(capacity: usize) -> SenseResult<Self> {
        if capacity == 0 {
            return Err(SenseError::InvalidWindow);
        }
        Ok(Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    /// Append a snapshot, evicting the oldest once the window is full.
    pub fn push(&mut self, snapshot: Snapshot) {
        while self.buffer.len() >= self.capacity {
            self.buffer.pop_front(); // Drop zeroizes
        }
        self.buffer.push_back(snapshot);
    }

    /// Fingerprint the buffered segment in arrival order.
    pub fn identify(&self) -> IdentityToken {
        identify(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for GaitWindow {
    fn default() -> Self {
        Self {
            buffer: VecDeque::with_capacity(DEFAULT_GAIT_WINDOW),
            capacity: DEFAULT_GAIT_WINDOW,
        }
    }
}

impl Drop for GaitWindow {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(values: &[f64]) -> Snapshot {
        Snapshot::new(values.to_vec()).unwrap()
    }

    fn is_token(token: &IdentityToken) -> bool {
        let s = token.as_str();
        s.len() == 11
            && s.starts_with("ID-")
            && s[3..]
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    #[test]
    fn identify_is_deterministic() {
        let segment = vec![snap(&[0.1, 0.2]), snap(&[0.3, 0.4])];
        let again = segment.clone();
        assert_eq!(identify(&segment), identify(&again));
        assert!(is_token(&identify(&segment)));
    }

    #[test]
    fn identify_distinguishes_values_and_order() {
        let a = vec![snap(&[0.1, 0.2]), snap(&[0.3, 0.4])];
        let b = vec![snap(&[0.1, 0.2]), snap(&[0.3, 0.5])];
        let reversed = vec![snap(&[0.3, 0.4]), snap(&[0.1, 0.2])];
        assert_ne!(identify(&a), identify(&b));
        assert_ne!(identify(&a), identify(&reversed));
    }

    #[test]
    fn identify_distinguishes_framing() {
        // same flat values, different snapshot boundaries
        let one = vec![snap(&[1.0, 2.0])];
        let two = vec![snap(&[1.0]), snap(&[2.0])];
        assert_ne!(identify(&one), identify(&two));
    }

    #[test]
    fn empty_segment_has_a_token() {
        let token = identify(&Vec::<Snapshot>::new());
        assert!(is_token(&token));
        assert_eq!(token.hex().len(), 8);
    }

    #[test]
    fn token_matches_truncated_sha256() {
        let segment = vec![snap(&[1.0])];
        let mut canonical = Vec::new();
        canonical.extend_from_slice(&1u64.to_le_bytes());
        canonical.extend_from_slice(&1u64.to_le_bytes());
        canonical.extend_from_slice(&1.0f64.to_bits().to_le_bytes());
        let digest = Sha256::digest(&canonical);
        let expected = format!("ID-{}", hex::encode(&digest[..4]).to_uppercase());
        assert_eq!(identify(&segment).as_str(), expected);
    }

    #[test]
    fn window_rejects_zero_capacity() {
        assert_eq!(GaitWindow::new(0).unwrap_err(), SenseError::InvalidWindow);
    }

    #[test]
    fn window_evicts_oldest() {
        let mut window = GaitWindow::new(2).unwrap();
        window.push(snap(&[1.0]));
        window.push(snap(&[2.0]));
        assert!(window.is_full());
        window.push(snap(&[3.0]));
        assert_eq!(window.len(), 2);
        assert_eq!(
            window.identify(),
            identify(&vec![snap(&[2.0]), snap(&[3.0])])
        );
    }

    #[test]
    fn window_clear_empties() {
        let mut window = GaitWindow::default();
        assert_eq!(window.capacity(), DEFAULT_GAIT_WINDOW);
        window.push(snap(&[1.0]));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.identify(), identify(&Vec::<Snapshot>::new()));
    }
}
