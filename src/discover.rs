//! Source file discovery.
//!
//! Walks the tree under the pattern's literal base directory, keeps the files
//! whose root-relative path matches the glob, drops the output file itself,
//! and shuffles the result so repeated runs produce different atlases.
//!
//! ## Glob semantics
//!
//! - `*` and `?` never cross a `/`; `**` spans any number of directories,
//!   including none (`**/*.jpg` matches `cover.jpg` at the root).
//! - Hidden entries (names starting with `.`) are skipped, directories included.
//! - Only files are returned; a directory named `something.jpg` is ignored.
//! - Leading `./` components are ignored: `./**/*.jpg` is `**/*.jpg`.
//! - A pattern whose base directory does not exist matches nothing. A base
//!   that cannot be inspected (no permission, a file in the way) is an error.

use globset::{GlobBuilder, GlobMatcher};
use rand::Rng;
use rand::seq::SliceRandom;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Invalid pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("Failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Find every file under `root` matching `pattern`, excluding `output`, in
/// random order.
///
/// Returned paths are relative to `root` (absolute when the pattern is).
pub fn discover<R: Rng + ?Sized>(
    root: &Path,
    pattern: &str,
    output: &Path,
    rng: &mut R,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut matches = find_matches(root, pattern, output)?;
    matches.shuffle(rng);
    Ok(matches)
}

/// Like [`discover`] but in sorted order.
pub fn find_matches(
    root: &Path,
    pattern: &str,
    output: &Path,
) -> Result<Vec<PathBuf>, DiscoverError> {
    let pattern = strip_cur_dir(pattern);
    let matcher = compile(pattern)?;
    let walk_root = root.join(literal_base(pattern));
    let excluded = normalize(&root.join(output));

    let base_exists = walk_root
        .try_exists()
        .map_err(|source| DiscoverError::Walk {
            path: walk_root.clone(),
            source,
        })?;
    if !base_exists {
        debug!(base = %walk_root.display(), "pattern base does not exist");
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    let walker = WalkDir::new(&walk_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.map_err(|e| DiscoverError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| walk_root.clone()),
            source: e.into(),
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if !matcher.is_match(relative) {
            continue;
        }
        if normalize(&root.join(relative)) == excluded {
            debug!(path = %relative.display(), "skipping output file");
            continue;
        }
        matches.push(relative.to_path_buf());
    }

    matches.sort();
    debug!(pattern, count = matches.len(), "discovery finished");
    Ok(matches)
}

/// Drop leading `./` so the pattern lines up with root-relative paths.
fn strip_cur_dir(pattern: &str) -> &str {
    let mut rest = pattern;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped.trim_start_matches('/');
    }
    rest
}

fn compile(pattern: &str) -> Result<GlobMatcher, DiscoverError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| DiscoverError::Pattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// The leading directories of `pattern` that contain no glob syntax.
///
/// The last component is never included, since it names the files.
fn literal_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let mut components: Vec<Component> = path.components().collect();
    components.pop();
    components
        .into_iter()
        .take_while(|c| !c.as_os_str().to_string_lossy().contains(['*', '?', '[', '{']))
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Lexically drop `.` components so `./atlas.jpg` and `atlas.jpg` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
