//! Partitioned text output: one `part-r-NNNNN` file per reduce partition and
//! a `_SUCCESS` marker written after all parts.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SUCCESS_MARKER: &str = "_SUCCESS";

pub fn part_file_name(index: usize) -> String {
    format!("part-r-{index:05}")
}

/// Write `parts[i]` to `<dir>/part-r-<i>`, one line per element.
///
/// `dir` must not exist yet. Parts are written in parallel; the marker is
/// written last, so its presence means every part is complete.
pub fn write_parts(dir: impl AsRef<Path>, parts: &[Vec<String>]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if dir.exists() {
        bail!("output directory {} already exists", dir.display());
    }
    create_dir_all(dir).with_context(|| format!("mkdir -p {}", dir.display()))?;

    let written = parts
        .par_iter()
        .enumerate()
        .map(|(i, lines)| {
            let path = dir.join(part_file_name(i));
            let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
            let mut w = BufWriter::new(f);
            for line in lines {
                writeln!(w, "{line}").with_context(|| format!("write {}", path.display()))?;
            }
            w.flush()?;
            Ok(path)
        })
        .collect::<Result<Vec<_>>>()?;

    File::create(dir.join(SUCCESS_MARKER)).context("write success marker")?;
    Ok(written)
}
