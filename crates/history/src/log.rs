//! Transaction log - append-only JSONL file of evaluated transactions
//!
//! Each line is one JSON-serialized [`TransactionRecord`]. The log is the
//! durable side of [`InMemoryHistory`]: replay it on startup, append to it
//! after every evaluation.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::HistoryResult;
use crate::memory::InMemoryHistory;
use crate::record::TransactionRecord;

/// Append-only JSONL log of transaction records
pub struct TransactionLog {
    path: PathBuf,
    file: File,
}

impl TransactionLog {
    /// Open (or create) a log at the given path
    pub fn open(path: impl AsRef<Path>) -> HistoryResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self { path, file })
    }

    /// Append a record
    pub fn append(&mut self, record: &TransactionRecord) -> HistoryResult<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()?;
        Ok(())
    }

    /// Read all records in file order
    pub fn read_all(&self) -> HistoryResult<Vec<TransactionRecord>> {
        read_jsonl(&self.path)
    }

    /// Rebuild an in-memory history from the log
    pub fn load(&self) -> HistoryResult<InMemoryHistory> {
        let records = self.read_all()?;
        tracing::info!(path = %self.path.display(), records = records.len(), "Loaded transaction log");
        InMemoryHistory::with_records(records)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Read a JSONL file of records, skipping blank lines
pub fn read_jsonl(path: &Path) -> HistoryResult<Vec<TransactionRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}
