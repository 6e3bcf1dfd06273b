//! Directory walker
//!
//! Depth-first traversal with terminal pruning: an excluded directory is
//! listed once but never descended into, so no file beneath it is read and
//! none of its subdirectories are opened. Entries of
//! each directory are visited in file-name order, which keeps the output
//! identical across platforms and runs.
//!
//! Any I/O failure aborts the whole walk.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::PipelineError;
use crate::core::model::FileRecord;
use crate::core::paths::{make_relative, normalize_path};
use crate::core::util::decode_lossy;
use crate::discovery::policy::ExclusionPolicy;

/// A file selected for reading, before its content is loaded
#[derive(Debug)]
struct Candidate {
    absolute: PathBuf,
    relative: String,
}

/// Walk `root` and read every file the policy does not exclude
pub fn walk(root: &Path, policy: &ExclusionPolicy) -> Result<Vec<FileRecord>, PipelineError> {
    let candidates = collect_candidates(root, policy)?;
    tracing::debug!(files = candidates.len(), root = %root.display(), "walk finished");
    read_candidates(candidates)
}

fn relative_path(root: &Path, path: &Path) -> String {
    make_relative(path, root).unwrap_or_else(|| normalize_path(path))
}

/// Pruning predicate for `filter_entry`; the root itself is always kept
fn is_entry_excluded(root: &Path, entry: &DirEntry, policy: &ExclusionPolicy) -> bool {
    if entry.depth() == 0 {
        return false;
    }

    let relative = relative_path(root, entry.path());
    let excluded = if entry.file_type().is_dir() {
        policy.is_dir_excluded(&relative)
    } else {
        policy.is_excluded(&relative)
    };

    if excluded {
        tracing::trace!(path = %relative, dir = entry.file_type().is_dir(), "excluded");
    }
    excluded
}

fn collect_candidates(
    root: &Path,
    policy: &ExclusionPolicy,
) -> Result<Vec<Candidate>, PipelineError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_entry_excluded(root, entry, policy));

    let mut candidates = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| PipelineError::Walk {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        // symlinks are not followed for descent; a link to a directory is skipped
        if entry.path_is_symlink() {
            let target = fs::metadata(entry.path()).map_err(|source| PipelineError::Read {
                path: entry.path().to_path_buf(),
                source,
            })?;
            if target.is_dir() {
                tracing::debug!(path = %entry.path().display(), "skipping symlinked directory");
                continue;
            }
        }

        candidates.push(Candidate {
            relative: relative_path(root, entry.path()),
            absolute: entry.into_path(),
        });
    }

    Ok(candidates)
}

fn read_candidate(candidate: Candidate) -> Result<FileRecord, PipelineError> {
    let bytes = fs::read(&candidate.absolute).map_err(|source| PipelineError::Read {
        path: candidate.absolute.clone(),
        source,
    })?;

    let (content, lossy) = decode_lossy(bytes);
    if lossy {
        tracing::debug!(path = %candidate.relative, "invalid UTF-8 replaced");
    }
    Ok(FileRecord::new(candidate.relative, content))
}

#[cfg(not(feature = "parallel"))]
fn read_candidates(candidates: Vec<Candidate>) -> Result<Vec<FileRecord>, PipelineError> {
    candidates.into_iter().map(read_candidate).collect()
}

/// Reads run on the rayon pool; `collect` keeps the enumeration order
#[cfg(feature = "parallel")]
fn read_candidates(candidates: Vec<Candidate>) -> Result<Vec<FileRecord>, PipelineError> {
    use rayon::prelude::*;

    candidates.into_par_iter().map(read_candidate).collect()
}
