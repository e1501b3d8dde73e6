//! Line-oriented input.
//!
//! The bulk filesystem is a collaborator behind [`LineSource`]; [`LocalFs`]
//! is the implementation used by the binaries and tests. Failures are reported
//! as [`PipelineError::SourceNotFound`] or [`PipelineError::SourceAccess`] so
//! callers can map them to distinct exit codes.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
//! failing the read; the affected line then fails field parsing like any
//! other malformed record.

use crate::error::{PipelineError, PipelineResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A fallible stream of lines, without their terminators.
pub type LineStream = Box<dyn Iterator<Item = PipelineResult<String>> + Send>;

pub trait LineSource: Send + Sync {
    /// Open `path` for sequential line reads.
    fn open(&self, path: &Path) -> PipelineResult<LineStream>;
}

/// Reads from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl LineSource for LocalFs {
    fn open(&self, path: &Path) -> PipelineResult<LineStream> {
        let f = File::open(path).map_err(|e| PipelineError::from_io(path, e))?;
        // Opening a directory succeeds on some platforms; reading it does not.
        if f.metadata().map(|m| m.is_dir()).unwrap_or(false) {
            return Err(PipelineError::SourceAccess {
                path: path.to_path_buf(),
                source: std::io::Error::other("is a directory"),
            });
        }
        Ok(Box::new(LossyLines {
            reader: BufReader::new(f),
            path: path.to_path_buf(),
            line: 0,
            buf: Vec::new(),
        }))
    }
}

/// `BufRead::lines` without the UTF-8 requirement.
struct LossyLines<R> {
    reader: R,
    path: PathBuf,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = PipelineResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line += 1;
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                let text = String::from_utf8_lossy(&self.buf);
                if matches!(text, std::borrow::Cow::Owned(_)) {
                    warn!(path = %self.path.display(), line = self.line, "invalid UTF-8 replaced");
                }
                Some(Ok(text.into_owned()))
            }
            Err(e) => Some(Err(PipelineError::from_io(self.path.clone(), e))),
        }
    }
}

/// In-memory source keyed by path, for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: std::collections::HashMap<PathBuf, Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<I, S>(mut self, path: impl Into<PathBuf>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files
            .insert(path.into(), lines.into_iter().map(Into::into).collect());
        self
    }
}

impl LineSource for MemorySource {
    fn open(&self, path: &Path) -> PipelineResult<LineStream> {
        let lines = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            })?;
        Ok(Box::new(lines.into_iter().map(Ok)))
    }
}

/// Read every line of every path, in order.
pub fn read_lines(source: &dyn LineSource, paths: &[PathBuf]) -> PipelineResult<Vec<String>> {
    let mut out = Vec::new();
    for path in paths {
        for line in source.open(path)? {
            out.push(line?);
        }
    }
    Ok(out)
}
