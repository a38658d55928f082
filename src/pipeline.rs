//! The atlas pipeline.
//!
//! One sequential pass, no retries:
//!
//! ```text
//! Idle → Discovering → Filtering → Planning → Compositing → Encoding → Done
//! ```
//!
//! The run ends early in `Done` when no usable image survives filtering.
//! A `check` run stops after planning.
//!
//! ## Failure modes
//!
//! | Failure | Effect |
//! |---|---|
//! | invalid config, bad pattern, directory walk error | fatal, nothing written |
//! | stat failure | file recorded as corrupt, run continues |
//! | size outside bounds | warning only, file still used |
//! | decode failure | file recorded as corrupt, cursor stays put |
//! | encode / write failure | fatal |
//!
//! ## Events
//!
//! Progress is reported as [`AtlasEvent`] values over an optional channel as
//! things happen; the CLI prints them through [`output`](crate::output).

use crate::compose::Compositor;
use crate::config::{AtlasConfig, ConfigError};
use crate::discover::{DiscoverError, discover};
use crate::filter::{Candidate, FilterOutcome, SizeAdvisory, Skipped, WorkingSet, filter_candidates};
use crate::imaging::{BackendError, GridSpec, ImageBackend, RustBackend, encode_atlas, plan_grid};
use rand::Rng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Discovery failed: {0}")]
    Discover(#[from] DiscoverError),
    #[error("Writing atlas failed: {0}")]
    Encode(#[from] BackendError),
}

/// Something worth telling the user about, emitted as it happens.
#[derive(Debug, Clone, PartialEq)]
pub enum AtlasEvent {
    Started { output: PathBuf, width: u32 },
    SizeBounds { min: u64, max: u64 },
    Matched { pattern: String, count: usize },
    StatFailed { path: PathBuf, reason: String },
    SizeAdvisory { path: PathBuf, advisory: SizeAdvisory },
    Planned { grid: GridSpec },
    LeftOut { paths: Vec<PathBuf> },
    /// `index` is 1-based over the files the compositor visits.
    Processing { path: PathBuf, index: usize, total: usize },
    DecodeFailed { path: PathBuf, reason: String },
    Written { path: PathBuf, width: u32 },
    NothingToDo,
}

/// Optional event sink. A reporter without a channel drops everything.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<Sender<AtlasEvent>>,
}

impl Reporter {
    pub fn new(tx: Option<Sender<AtlasEvent>>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: AtlasEvent) {
        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is listening any more.
            tx.send(event).ok();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Discovering,
    Filtering,
    Planning,
    Compositing,
    Encoding,
    Done,
}

/// Whether the run composites and writes, or only plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Build,
    Check,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Written { path: PathBuf, width: u32 },
    Planned,
    NothingToDo,
}

/// Everything a run found out, for the summary and `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct AtlasReport {
    pub matched: usize,
    pub working_set: WorkingSet,
    pub grid: Option<GridSpec>,
    pub placed: Vec<PathBuf>,
    pub left_out: Vec<PathBuf>,
    /// Stat and decode failures, in the order they happened.
    pub corrupt: Vec<Skipped>,
    pub outcome: Outcome,
}

/// Build the atlas described by `config` with the `image`-crate backend.
pub fn run<R: Rng + ?Sized>(
    config: &AtlasConfig,
    rng: &mut R,
    events: Option<Sender<AtlasEvent>>,
) -> Result<AtlasReport, AtlasError> {
    run_with_backend(&RustBackend::new(), config, rng, Mode::Build, events)
}

/// Discover, filter and plan without compositing or writing anything.
pub fn check<R: Rng + ?Sized>(
    config: &AtlasConfig,
    rng: &mut R,
    events: Option<Sender<AtlasEvent>>,
) -> Result<AtlasReport, AtlasError> {
    run_with_backend(&RustBackend::new(), config, rng, Mode::Check, events)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn run_with_backend<B: ImageBackend, R: Rng + ?Sized>(
    backend: &B,
    config: &AtlasConfig,
    rng: &mut R,
    mode: Mode,
    events: Option<Sender<AtlasEvent>>,
) -> Result<AtlasReport, AtlasError> {
    let reporter = Reporter::new(events);
    let mut stage = Stage::Idle;

    config.validate()?;
    reporter.emit(AtlasEvent::Started {
        output: config.file_name.clone(),
        width: config.width,
    });
    reporter.emit(AtlasEvent::SizeBounds {
        min: config.min_file_size,
        max: config.max_file_size,
    });

    enter(&mut stage, Stage::Discovering);
    let candidates = discover(&config.root, &config.pattern, &config.file_name, rng)
        .inspect_err(|e| warn!(error = %e, "discovery failed"))?;
    let matched = candidates.len();
    reporter.emit(AtlasEvent::Matched {
        pattern: config.pattern.clone(),
        count: matched,
    });

    enter(&mut stage, Stage::Filtering);
    let FilterOutcome {
        working_set,
        mut corrupt,
    } = filter_candidates(
        &config.root,
        candidates.into_iter().map(Candidate::new),
        config.size_bounds(),
        &reporter,
    );

    let mut report = AtlasReport {
        matched,
        working_set,
        grid: None,
        placed: Vec::new(),
        left_out: Vec::new(),
        corrupt: Vec::new(),
        outcome: Outcome::NothingToDo,
    };

    enter(&mut stage, Stage::Planning);
    let grid = plan_grid(report.working_set.len(), config.width);
    if grid.is_empty() {
        reporter.emit(AtlasEvent::NothingToDo);
        enter(&mut stage, Stage::Done);
        report.corrupt = corrupt;
        return Ok(report);
    }
    reporter.emit(AtlasEvent::Planned { grid });
    report.grid = Some(grid);
    if grid.left_out(report.working_set.len()) > 0 {
        report.left_out = report.working_set.as_slice()[grid.capacity()..].to_vec();
        reporter.emit(AtlasEvent::LeftOut {
            paths: report.left_out.clone(),
        });
    }

    if mode == Mode::Check {
        enter(&mut stage, Stage::Done);
        report.corrupt = corrupt;
        report.outcome = Outcome::Planned;
        return Ok(report);
    }

    enter(&mut stage, Stage::Compositing);
    let composited =
        Compositor::new(backend, grid).composite(&config.root, &report.working_set, &reporter);
    corrupt.extend(composited.failed);
    report.placed = composited.placed;
    report.corrupt = corrupt;

    enter(&mut stage, Stage::Encoding);
    let output = config.output_path();
    encode_atlas(
        backend,
        composited.canvas.into_image(),
        &output,
        config.width,
        config.quality,
    )
    .inspect_err(|e| warn!(output = %output.display(), error = %e, "encoding failed"))?;
    reporter.emit(AtlasEvent::Written {
        path: config.file_name.clone(),
        width: config.width,
    });
    report.outcome = Outcome::Written {
        path: output,
        width: config.width,
    };

    enter(&mut stage, Stage::Done);
    Ok(report)
}

fn enter(stage: &mut Stage, next: Stage) {
    debug!(from = ?*stage, to = ?next, "pipeline stage");
    *stage = next;
}
