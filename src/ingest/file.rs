//! Local file replay source.
//!
//! One snapshot per line, values separated by commas and/or whitespace.
//! Blank lines and `#` comments are skipped. The first data line fixes the
//! channel count; any later line of a different width is an error. End of
//! file ends the stream.
//!
//! The file source MUST NOT fetch remote URLs.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use super::SourceStats;
use crate::snapshot::Snapshot;

pub struct FileSource {
    path: String,
    lines: Option<Lines<BufReader<File>>>,
    line_no: usize,
    channels: Option<usize>,
    snapshot_count: u64,
    exhausted: bool,
}

impl FileSource {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            lines: None,
            line_no: 0,
            channels: None,
            snapshot_count: 0,
            exhausted: false,
        }
    }

    pub fn connect(&mut self) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open snapshot file {}", self.path))?;
        self.lines = Some(BufReader::new(file).lines());
        self.line_no = 0;
        self.channels = None;
        self.snapshot_count = 0;
        self.exhausted = false;
        log::info!("FileSource: replaying {}", self.path);
        Ok(())
    }

    pub fn next_snapshot(&mut self) -> Result<Option<Snapshot>> {
        let lines = self
            .lines
            .as_mut()
            .ok_or_else(|| anyhow!("file source {} is not connected", self.path))?;

        for line in lines.by_ref() {
            self.line_no += 1;
            let line = line.with_context(|| format!("failed to read {}", self.path))?;
            let Some(values) = parse_line(&line)
                .with_context(|| format!("{}:{}", self.path, self.line_no))?
            else {
                continue;
            };

            match self.channels {
                None => self.channels = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(anyhow!(
                        "{}:{}: expected {} values, found {}",
                        self.path,
                        self.line_no,
                        expected,
                        values.len()
                    ));
                }
                Some(_) => {}
            }

            self.snapshot_count += 1;
            return Ok(Some(Snapshot::new(values)?));
        }

        if !self.exhausted {
            self.exhausted = true;
            log::info!(
                "FileSource: end of {} after {} snapshots",
                self.path,
                self.snapshot_count
            );
        }
        Ok(None)
    }

    /// Channel count established by the first data line.
    pub fn channels(&self) -> Option<usize> {
        self.channels
    }

    pub fn is_healthy(&self) -> bool {
        self.lines.is_some() && !self.exhausted
    }

    pub fn stats(&self) -> SourceStats {
        SourceStats {
            snapshots_read: self.snapshot_count,
            url: self.path.clone(),
        }
    }
}

/// Parse one replay line. `Ok(None)` for blank and comment-only lines.
fn parse_line(line: &str) -> Result<Option<Vec<f64>>> {
    let data = match line.split_once('#') {
        Some((data, _comment)) => data,
        None => line,
    };
    let values = data
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| anyhow!("invalid number '{token}'"))
        })
        .collect::<Result<Vec<f64>>>()?;
    if values.is_empty() {
        Ok(None)
    } else {
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators() {
        assert_eq!(
            parse_line("1.0, 2.5  3e-1,-4").unwrap(),
            Some(vec![1.0, 2.5, 0.3, -4.0])
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# empty room").unwrap(), None);
        assert_eq!(parse_line("1 2 # tail").unwrap(), Some(vec![1.0, 2.0]));
    }

    #[test]
    fn rejects_non_numeric_tokens() {
        assert!(parse_line("1.0, abc").is_err());
    }

    #[test]
    fn unconnected_source_errors() {
        let mut source = FileSource::new("does-not-matter.csv");
        assert!(source.next_snapshot().is_err());
        assert!(!source.is_healthy());
    }
}
