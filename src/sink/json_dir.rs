use super::{RowPut, Table, TableSink, missing_table};
use crate::error::{PipelineError, PipelineResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Directory-backed store: one pretty-printed JSON document per table.
#[derive(Clone, Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
}

fn sink_err(what: &str, path: &Path, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::SinkWrite(format!("{what} {}: {e}", path.display()))
}

impl JsonDirStore {
    pub fn open(dir: impl Into<PathBuf>) -> PipelineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| sink_err("mkdir -p", &dir, e))?;
        Ok(Self { dir })
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }

    fn load(&self, table: &str) -> PipelineResult<Table> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(missing_table(table));
        }
        let f = File::open(&path).map_err(|e| sink_err("open", &path, e))?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| sink_err("parse", &path, e))
    }

    fn save(&self, table: &str, t: &Table) -> PipelineResult<()> {
        let path = self.table_path(table);
        let f = File::create(&path).map_err(|e| sink_err("create", &path, e))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, t).map_err(|e| sink_err("serialize", &path, e))?;
        w.flush().map_err(|e| sink_err("flush", &path, e))
    }
}

impl TableSink for JsonDirStore {
    fn recreate_table(&mut self, table: &str, family: &str) -> PipelineResult<()> {
        let path = self.table_path(table);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| sink_err("drop", &path, e))?;
        }
        self.save(table, &Table::with_family(family))
    }

    fn put_batch(&mut self, table: &str, puts: Vec<RowPut>) -> PipelineResult<usize> {
        let mut t = self.load(table)?;
        let mut n = 0;
        let mut failure = None;
        for put in puts {
            if let Err(e) = t.apply(table, put) {
                failure = Some(e);
                break;
            }
            n += 1;
        }
        // rows applied before a failure are persisted
        self.save(table, &t)?;
        match failure {
            Some(e) => Err(e),
            None => Ok(n),
        }
    }

    fn scan(&self, table: &str) -> PipelineResult<Table> {
        self.load(table)
    }
}
