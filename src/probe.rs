//! File probing: the core's only I/O dependency.
//!
//! Status refresh asks one question per file — does it exist, and how many
//! lines does it have. The port is injectable so tests never touch a real
//! filesystem.

use async_trait::async_trait;
use std::path::Path;

/// Outcome of probing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResult {
    /// The file cannot be opened or read.
    Missing,
    Present { line_count: u32 },
}

/// Resolves a path to its existence and line count.
#[async_trait]
pub trait LineProbe: Send + Sync {
    async fn resolve(&self, path: &Path) -> ProbeResult;
}

/// Probe backed by the real filesystem.
///
/// Line count is the number of newline-separated segments: newline bytes + 1,
/// so an empty file has one line and a trailing newline does not add one
/// beyond the final empty segment.
pub struct FsLineProbe;

impl FsLineProbe {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsLineProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineProbe for FsLineProbe {
    async fn resolve(&self, path: &Path) -> ProbeResult {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let newlines = bytes.iter().filter(|&&b| b == b'\n').count() as u32;
                ProbeResult::Present {
                    line_count: newlines + 1,
                }
            }
            Err(_) => ProbeResult::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_resolves_missing() {
        let dir = tempfile::tempdir().unwrap();
        let probe = FsLineProbe::new();
        assert_eq!(
            probe.resolve(&dir.path().join("ghost.txt")).await,
            ProbeResult::Missing
        );
    }

    #[tokio::test]
    async fn counts_newline_separated_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, "one\ntwo\nthree").unwrap();

        let probe = FsLineProbe::new();
        assert_eq!(
            probe.resolve(&path).await,
            ProbeResult::Present { line_count: 3 }
        );
    }

    #[tokio::test]
    async fn empty_file_has_one_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::File::create(&path).unwrap();

        let probe = FsLineProbe::new();
        assert_eq!(
            probe.resolve(&path).await,
            ProbeResult::Present { line_count: 1 }
        );
    }

    #[tokio::test]
    async fn trailing_newline_counts_final_empty_segment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        let probe = FsLineProbe::new();
        assert_eq!(
            probe.resolve(&path).await,
            ProbeResult::Present { line_count: 3 }
        );
    }
}
