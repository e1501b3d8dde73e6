//! Helpers for tests of pipelines built on this crate.
//!
//! - [`assert_collections_unordered_equal`] compares outputs whose order
//!   depends on partitioning.
//! - [`write_input`] drops lines into a scratch file.
//! - [`table_rows`] flattens a sink table into sorted value tuples.

use crate::sink::Table;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Assert that two collections hold the same elements, ignoring order.
///
/// # Panics
///
/// Panics if the sorted collections differ.
pub fn assert_collections_unordered_equal<T: Debug + Ord + Clone>(actual: &[T], expected: &[T]) {
    let mut a = actual.to_vec();
    let mut e = expected.to_vec();
    a.sort();
    e.sort();
    assert_eq!(
        a, e,
        "Collections differ (order ignored):\n  Expected: {expected:?}\n  Actual: {actual:?}"
    );
}

/// Write `lines` (newline-terminated) to `dir/name` and return the path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_input<S: AsRef<str>>(dir: &Path, name: &str, lines: &[S]) -> PathBuf {
    let path = dir.join(name);
    let mut body = String::new();
    for l in lines {
        body.push_str(l.as_ref());
        body.push('\n');
    }
    fs::write(&path, body).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    path
}

/// Each row's values for `qualifiers` in `family`, sorted. Missing cells
/// come back as empty strings.
pub fn table_rows(table: &Table, family: &str, qualifiers: &[&str]) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = table
        .rows
        .values()
        .map(|cells| {
            qualifiers
                .iter()
                .map(|q| {
                    cells
                        .get(family)
                        .and_then(|f| f.get(*q))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    rows.sort();
    rows
}

/// Lines of every `part-r-*` file under `dir`, sorted.
///
/// # Panics
///
/// Panics if `dir` cannot be read.
pub fn read_part_lines(dir: &Path) -> Vec<String> {
    let mut out = Vec::new();
    let entries = fs::read_dir(dir).unwrap_or_else(|e| panic!("read {}: {e}", dir.display()));
    for entry in entries.flatten() {
        let path = entry.path();
        let is_part = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("part-r-"));
        if is_part {
            let body = fs::read_to_string(&path).unwrap_or_default();
            out.extend(body.lines().map(str::to_owned));
        }
    }
    out.sort();
    out
}
