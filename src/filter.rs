//! Stat-based filtering of discovered files.
//!
//! Every candidate is stat'd once. Files that cannot be stat'd go to the
//! corrupt list; everything else joins the working set. The size bounds are
//! advisory: a file outside them is reported but still admitted.

use crate::pipeline::{AtlasEvent, Reporter};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configured file-size window, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeBounds {
    pub min: u64,
    pub max: u64,
}

/// A file size outside the configured window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeAdvisory {
    TooBig { size: u64, max: u64 },
    TooSmall { size: u64, min: u64 },
}

impl SizeBounds {
    pub fn check(&self, size: u64) -> Option<SizeAdvisory> {
        if size > self.max {
            Some(SizeAdvisory::TooBig {
                size,
                max: self.max,
            })
        } else if size < self.min {
            Some(SizeAdvisory::TooSmall {
                size,
                min: self.min,
            })
        } else {
            None
        }
    }
}

/// A discovered path whose size has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stat the file (following symlinks) and return its size.
    pub fn size(&self, root: &Path) -> std::io::Result<u64> {
        std::fs::metadata(root.join(&self.path)).map(|meta| meta.len())
    }
}

/// Ordered paths eligible for the grid. Only filtering appends to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkingSet(Vec<PathBuf>);

impl WorkingSet {
    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.0.iter()
    }

    fn push(&mut self, path: PathBuf) {
        self.0.push(path);
    }
}

impl FromIterator<PathBuf> for WorkingSet {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Why a file never made it into the atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Stat(String),
    Decode(String),
}

/// One entry of the corrupt list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub working_set: WorkingSet,
    pub corrupt: Vec<Skipped>,
}

/// Stat every candidate in order and split them into the working set and
/// the corrupt list.
pub fn filter_candidates(
    root: &Path,
    candidates: impl IntoIterator<Item = Candidate>,
    bounds: SizeBounds,
    reporter: &Reporter,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for candidate in candidates {
        let size = match candidate.size(root) {
            Ok(size) => size,
            Err(e) => {
                debug!(path = %candidate.path.display(), error = %e, "stat failed");
                reporter.emit(AtlasEvent::StatFailed {
                    path: candidate.path.clone(),
                    reason: e.to_string(),
                });
                outcome.corrupt.push(Skipped {
                    path: candidate.path,
                    reason: SkipReason::Stat(e.to_string()),
                });
                continue;
            }
        };

        if let Some(advisory) = bounds.check(size) {
            reporter.emit(AtlasEvent::SizeAdvisory {
                path: candidate.path.clone(),
                advisory,
            });
        }
        outcome.working_set.push(candidate.path);
    }

    outcome
}
