//! Input path expansion for the aggregation job.
//!
//! Each input argument may name a file, a directory (its regular files,
//! skipping `_`/`.`-prefixed bookkeeping entries), or a glob pattern. Results
//! are sorted so split assignment is deterministic.

use crate::error::{PipelineError, PipelineResult};
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_') || n.starts_with('.'))
}

fn has_glob_meta(s: &str) -> bool {
    s.contains(['*', '?', '['])
}

fn list_dir(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| PipelineError::from_io(dir, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| PipelineError::from_io(dir, e))?.path();
        if path.is_file() && !is_hidden(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

fn expand_glob(pattern: &str) -> PipelineResult<Vec<PathBuf>> {
    let paths = glob(pattern)
        .map_err(|e| PipelineError::Argument(format!("invalid glob pattern {pattern}: {e}")))?;
    let mut out = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let p = e.path().to_path_buf();
            PipelineError::from_io(p, std::io::Error::from(e))
        })?;
        if path.is_file() && !is_hidden(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// Expand one input argument into concrete files.
pub fn expand_input(input: &str) -> PipelineResult<Vec<PathBuf>> {
    let path = Path::new(input);
    let files = if path.is_dir() {
        list_dir(path)?
    } else if path.exists() {
        vec![path.to_path_buf()]
    } else if has_glob_meta(input) {
        expand_glob(input)?
    } else {
        Vec::new()
    };
    if files.is_empty() && !path.is_dir() {
        return Err(PipelineError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(files)
}

/// Expand every input argument, keeping argument order.
pub fn expand_inputs<S: AsRef<str>>(inputs: &[S]) -> PipelineResult<Vec<PathBuf>> {
    let mut out = Vec::new();
    for i in inputs {
        out.extend(expand_input(i.as_ref())?);
    }
    Ok(out)
}
