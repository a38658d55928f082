//! CLI output formatting.
//!
//! Every diagnostic the pipeline produces is turned into text here. Each
//! `format_*` function returns `Vec<String>` for testability; the CLI prints
//! the lines. Format functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ```text
//! Atlas of 1000x1000px will be saved to atlas.jpg
//! Looking for files between 3072 and 3145728
//! Pattern **/*.jpg matched 11 files
//! Could not read stats for vanished.jpg
//! File Live/cover.jpg is too small (812 is less than 3072 bytes)
//! Atlas size: 1002, single size: 334
//! 1 images left out
//!     Extra/cover.jpg
//! Processing A - 1999 - B/front.jpg (1 of 9)
//! Could not load broken.jpg. Is file corrupt?
//!     Processing failed: Failed to decode broken.jpg: ...
//! Wrote 1000x1000px atlas to atlas.jpg
//!
//! Placed 8 images, 1 left out, 2 unprocessed
//! Unprocessed files: vanished.jpg,broken.jpg
//! ```

use crate::filter::SizeAdvisory;
use crate::pipeline::{AtlasEvent, AtlasReport, Outcome};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn show(path: &Path) -> String {
    path.display().to_string()
}

fn join_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    paths
        .into_iter()
        .map(show)
        .collect::<Vec<_>>()
        .join(",")
}

/// Format one pipeline event as it arrives.
pub fn format_event(event: &AtlasEvent) -> Vec<String> {
    match event {
        AtlasEvent::Started { output, width } => vec![format!(
            "Atlas of {width}x{width}px will be saved to {}",
            show(output)
        )],
        AtlasEvent::SizeBounds { min, max } => {
            vec![format!("Looking for files between {min} and {max}")]
        }
        AtlasEvent::Matched { pattern, count } => {
            vec![format!("Pattern {pattern} matched {count} files")]
        }
        AtlasEvent::StatFailed { path, .. } => {
            vec![format!("Could not read stats for {}", show(path))]
        }
        AtlasEvent::SizeAdvisory { path, advisory } => vec![format_advisory(path, advisory)],
        AtlasEvent::Planned { grid } => vec![format!(
            "Atlas size: {}, single size: {}",
            grid.canvas_size, grid.cell_size
        )],
        AtlasEvent::LeftOut { paths } => {
            let mut lines = vec![format!("{} images left out", paths.len())];
            lines.extend(paths.iter().map(|p| format!("{}{}", indent(1), show(p))));
            lines
        }
        AtlasEvent::Processing { path, index, total } => {
            vec![format!("Processing {} ({index} of {total})", show(path))]
        }
        AtlasEvent::DecodeFailed { path, reason } => vec![
            format!("Could not load {}. Is file corrupt?", show(path)),
            format!("{}{reason}", indent(1)),
        ],
        AtlasEvent::Written { path, width } => vec![format!(
            "Wrote {width}x{width}px atlas to {}",
            show(path)
        )],
        AtlasEvent::NothingToDo => vec!["No usable images, atlas not written".to_string()],
    }
}

fn format_advisory(path: &Path, advisory: &SizeAdvisory) -> String {
    match advisory {
        SizeAdvisory::TooBig { size, max } => format!(
            "File {} is too big ({size} exceeds {max} bytes)",
            show(path)
        ),
        SizeAdvisory::TooSmall { size, min } => format!(
            "File {} is too small ({size} is less than {min} bytes)",
            show(path)
        ),
    }
}

/// Final tally printed once the run is over.
pub fn format_summary(report: &AtlasReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.outcome {
        Outcome::NothingToDo => {}
        Outcome::Planned => {
            if let Some(grid) = report.grid {
                lines.push(format!(
                    "Would place {} images in a {}x{} grid, {} left out",
                    report.working_set.len() - report.left_out.len(),
                    grid.side,
                    grid.side,
                    report.left_out.len()
                ));
            }
        }
        Outcome::Written { .. } => lines.push(format!(
            "Placed {} images, {} left out, {} unprocessed",
            report.placed.len(),
            report.left_out.len(),
            report.corrupt.len()
        )),
    }
    if !report.corrupt.is_empty() {
        lines.push(format!(
            "Unprocessed files: {}",
            join_paths(report.corrupt.iter().map(|s| s.path.as_path()))
        ));
    }
    lines
}

/// Print the final tally to stdout.
pub fn print_summary(report: &AtlasReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}
