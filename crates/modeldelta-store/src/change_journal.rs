//! Change journal: an explicit accumulator of ChangeSet records.
//!
//! Records stay in memory until [`ChangeJournal::flush`] appends them to the
//! journal file, one JSON object per line. Nothing is written implicitly.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, not_found, Result};
use modeldelta_core::diff::{ChangeSet, ChangeSetRecord};
use modeldelta_core::errors::{ExError, ExErrorKind};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct ChangeJournal {
    path: PathBuf,
    pending: Vec<ChangeSetRecord>,
}

impl ChangeJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a ChangeSet. Empty change sets from failed runs are kept so the
    /// failure itself is journaled; empty successful ones are skipped.
    pub fn record(&mut self, changes: &ChangeSet) {
        if changes.is_empty() && changes.execution_success {
            return;
        }
        self.pending.push(ChangeSetRecord::from(changes));
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Append all pending records to the journal file and clear the queue.
    /// Returns the number of records written.
    ///
    /// On error the pending records are kept, so the flush can be retried.
    ///
    /// # Errors
    ///
    /// Returns `ERR_SERIALIZATION` or `ERR_IO` if the records cannot be written.
    pub fn flush(&mut self) -> Result<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let mut buf = Vec::new();
        for record in &self.pending {
            serde_json::to_writer(&mut buf, record).map_err(|e| {
                ExError::new(ExErrorKind::Serialization)
                    .with_op("flush_journal")
                    .with_message(e.to_string())
            })?;
            buf.push(b'\n');
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error("flush_journal", e))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| io_error("flush_journal", e))?;
        file.write_all(&buf)
            .map_err(|e| io_error("flush_journal", e))?;

        let written = self.pending.len();
        self.pending.clear();
        tracing::debug!(
            path = %self.path.display(),
            records = written,
            "flushed change journal"
        );
        Ok(written)
    }

    /// Read every record in a journal file, in append order. Blank lines are
    /// skipped.
    ///
    /// # Errors
    ///
    /// - `ERR_NOT_FOUND` if the file does not exist
    /// - `ERR_SERIALIZATION` naming the line number of a malformed record
    pub fn read_all(path: &Path) -> Result<Vec<ChangeSetRecord>> {
        if !path.exists() {
            return Err(not_found("read_journal", path));
        }
        let text = fs::read_to_string(path).map_err(|e| io_error("read_journal", e))?;
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|e| {
                    ExError::new(ExErrorKind::Serialization)
                        .with_op("read_journal")
                        .with_message(format!("{}:{}: {}", path.display(), index + 1, e))
                })
            })
            .collect()
    }
}

impl Drop for ChangeJournal {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            tracing::warn!(
                path = %self.path.display(),
                pending = self.pending.len(),
                "change journal dropped with unflushed records"
            );
        }
    }
}
