//! Snapshot acquisition sources.
//!
//! The core makes no assumption about where snapshots come from. This layer
//! provides the collaborators the harness uses:
//! - Synthetic room scenes (`stub://<scene>`) for demos and tests
//! - Local file replay (one snapshot per line)
//!
//! Radio drivers (ESP32 CSI, router firmware) plug in here in deployments;
//! network URLs are rejected.
//!
//! Sources MUST NOT log raw snapshot values.

pub mod file;
pub mod synthetic;

use anyhow::{anyhow, Result};

pub use file::FileSource;
pub use synthetic::{Scene, SyntheticSource};

use crate::snapshot::Snapshot;

pub const DEFAULT_SOURCE_URL: &str = "stub://cycle";
pub const DEFAULT_CHANNELS: usize = 64;
pub const DEFAULT_RATE_HZ: u32 = 10;

/// Configuration for a snapshot source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceConfig {
    /// `stub://<scene>` or a local file path.
    pub url: String,
    /// Channels per snapshot (synthetic sources).
    pub channels: usize,
    /// Target snapshot rate; pacing is up to the caller.
    pub rate_hz: u32,
    /// Seed for reproducible synthetic output.
    pub seed: Option<u64>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            channels: DEFAULT_CHANNELS,
            rate_hz: DEFAULT_RATE_HZ,
            seed: None,
        }
    }
}

/// Snapshot source selected from the configured URL.
pub struct SnapshotSource {
    backend: SourceBackend,
}

enum SourceBackend {
    Synthetic(SyntheticSource),
    File(FileSource),
}

impl SnapshotSource {
    pub fn new(config: SourceConfig) -> Result<Self> {
        if let Some(scene) = config.url.strip_prefix("stub://") {
            let scene: Scene = scene.parse()?;
            Ok(Self {
                backend: SourceBackend::Synthetic(SyntheticSource::new(scene, &config)?),
            })
        } else if is_local_file_path(&config.url) {
            Ok(Self {
                backend: SourceBackend::File(FileSource::new(&config.url)),
            })
        } else {
            Err(anyhow!(
                "unsupported source '{}': expected stub://<scene> or a local file path",
                config.url
            ))
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.connect(),
            SourceBackend::File(source) => source.connect(),
        }
    }

    /// Next snapshot, or `None` once a finite source is exhausted.
    pub fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        match &mut self.backend {
            SourceBackend::Synthetic(source) => source.next_snapshot().map(Some),
            SourceBackend::File(source) => source.next_snapshot(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.is_healthy(),
            SourceBackend::File(source) => source.is_healthy(),
        }
    }

    pub fn stats(&self) -> SourceStats {
        match &self.backend {
            SourceBackend::Synthetic(source) => source.stats(),
            SourceBackend::File(source) => source.stats(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SourceStats {
    pub snapshots_read: u64,
    pub url: String,
}

fn is_local_file_path(path: &str) -> bool {
    !path.trim().is_empty() && !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_network_urls() {
        let config = SourceConfig {
            url: "udp://192.168.4.1:5005".to_string(),
            ..SourceConfig::default()
        };
        assert!(SnapshotSource::new(config).is_err());
    }

    #[test]
    fn rejects_unknown_scene() {
        let config = SourceConfig {
            url: "stub://party".to_string(),
            ..SourceConfig::default()
        };
        assert!(SnapshotSource::new(config).is_err());
    }

    #[test]
    fn stub_source_produces_configured_width() {
        let mut source = SnapshotSource::new(SourceConfig {
            url: "stub://empty".to_string(),
            channels: 8,
            seed: Some(1),
            ..SourceConfig::default()
        })
        .unwrap();
        source.connect().unwrap();
        let snapshot = source.next_snapshot().unwrap().unwrap();
        assert_eq!(snapshot.len(), 8);
        assert_eq!(source.stats().snapshots_read, 1);
        assert!(source.is_healthy());
    }
}
