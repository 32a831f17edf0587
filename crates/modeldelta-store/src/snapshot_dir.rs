//! Per-document snapshot directory.
//!
//! Files are named `{counter:03}_{YYYY-MM-DD}_{HH-MM-SS}.json`. The counter is
//! one past the highest counter already present, so it increases
//! monotonically even when files are removed from the middle.
//!
//! Each save also writes `{stem}_reconstruct.py` beside the JSON. Listing
//! only considers `.json` files, so the scripts never count as snapshots.

#![allow(clippy::result_large_err)]

use crate::atomic::{atomic_write, TEMP_SUFFIX};
use crate::errors::{io_error, not_found, serialization_error, Result};
use crate::snapshot_file::SnapshotFile;
use chrono::{DateTime, Utc};
use modeldelta_core::diff::{diff_with_options, ChangeSet, DiffOptions};
use modeldelta_core::snapshot::timestamp::lenient;
use modeldelta_core::snapshot::{reconstruction_script, DocumentInfo, Snapshot, SCRIPT_SUFFIX};
use modeldelta_core::{log_op_end, log_op_error, log_op_start};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const EXTENSION: &str = "json";

/// Listing entry for one saved snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub path: PathBuf,
    pub counter: u32,
    pub timestamp: DateTime<Utc>,
    pub document_name: String,
    pub object_count: usize,
}

/// The header fields of a snapshot document; `objects` is skipped.
#[derive(Deserialize)]
struct SnapshotHeader {
    #[serde(with = "lenient")]
    timestamp: DateTime<Utc>,
    document: DocumentInfo,
    object_count: usize,
}

/// Directory holding the saved snapshots of one document.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    /// The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Counter prefix of a snapshot file name, e.g. `7` for `007_2024-05-01_10-00-00.json`.
    pub fn parse_counter(path: &Path) -> Option<u32> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(TEMP_SUFFIX) || path.extension()?.to_str()? != EXTENSION {
            return None;
        }
        let (prefix, _) = name.split_once('_')?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }

    /// File name for a snapshot saved with `counter`.
    pub fn file_name(counter: u32, timestamp: DateTime<Utc>) -> String {
        format!(
            "{:03}_{}.{}",
            counter,
            timestamp.format("%Y-%m-%d_%H-%M-%S"),
            EXTENSION
        )
    }

    /// Reconstruction script path for a snapshot file:
    /// `007_2024-05-01_10-00-00.json` → `007_2024-05-01_10-00-00_reconstruct.py`.
    pub fn script_path(snapshot_path: &Path) -> PathBuf {
        let stem = snapshot_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        snapshot_path.with_file_name(format!("{}{}", stem, SCRIPT_SUFFIX))
    }

    /// Snapshot files with their counters, oldest first.
    fn entries(&self) -> Result<Vec<(u32, PathBuf)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(|e| io_error("list_snapshots", e))? {
            let path = entry.map_err(|e| io_error("list_snapshots", e))?.path();
            if let Some(counter) = Self::parse_counter(&path) {
                entries.push((counter, path));
            }
        }
        entries.sort();
        Ok(entries)
    }

    /// Counter the next [`save`](Self::save) will use. Starts at 1.
    ///
    /// # Errors
    ///
    /// Returns `ERR_IO` if the directory cannot be read.
    pub fn next_counter(&self) -> Result<u32> {
        Ok(self
            .entries()?
            .last()
            .map(|(counter, _)| counter + 1)
            .unwrap_or(1))
    }

    /// Write `snapshot` under the next counter and return its path. The
    /// reconstruction script is written next to it, after the JSON.
    ///
    /// # Errors
    ///
    /// Returns `ERR_IO` or `ERR_SERIALIZATION` if the file cannot be written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let start = Instant::now();
        log_op_start!("save_snapshot", document = snapshot.document_name());

        let result = self.write_next(snapshot);
        match &result {
            Ok(path) => {
                log_op_end!(
                    "save_snapshot",
                    duration_ms = start.elapsed().as_millis() as u64,
                    path = %path.display(),
                    object_count = snapshot.len()
                );
            }
            Err(err) => {
                log_op_error!(
                    "save_snapshot",
                    err.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
            }
        }
        result
    }

    fn write_next(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let counter = self.next_counter()?;
        let path = self
            .root
            .join(Self::file_name(counter, snapshot.timestamp()));
        let bytes = SnapshotFile::from(snapshot).to_json(&path)?;
        atomic_write(&path, &bytes)?;
        atomic_write(
            &Self::script_path(&path),
            reconstruction_script(snapshot).as_bytes(),
        )?;
        Ok(path)
    }

    /// Load one snapshot file.
    ///
    /// # Errors
    ///
    /// - `ERR_NOT_FOUND` if the file does not exist
    /// - `ERR_SERIALIZATION` / `ERR_INVALID_SNAPSHOT` for malformed documents
    pub fn load(&self, path: &Path) -> Result<Snapshot> {
        if !path.exists() {
            return Err(not_found("load_snapshot", path));
        }
        let bytes = fs::read(path).map_err(|e| io_error("load_snapshot", e))?;
        SnapshotFile::parse(&bytes, path)
    }

    /// Summaries of all saved snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a snapshot header cannot be read.
    pub fn list(&self) -> Result<Vec<SnapshotSummary>> {
        let mut summaries = Vec::new();
        for (counter, path) in self.entries()?.into_iter().rev() {
            let bytes = fs::read(&path).map_err(|e| io_error("list_snapshots", e))?;
            let header: SnapshotHeader = serde_json::from_slice(&bytes)
                .map_err(|e| serialization_error("list_snapshots", &path, e))?;
            summaries.push(SnapshotSummary {
                path,
                counter,
                timestamp: header.timestamp,
                document_name: header.document.name,
                object_count: header.object_count,
            });
        }
        Ok(summaries)
    }

    /// The most recently saved snapshot, if any.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn latest(&self) -> Result<Option<Snapshot>> {
        match self.entries()?.pop() {
            Some((_, path)) => self.load(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Rebuild change history: one ChangeSet per saved snapshot, oldest first.
    ///
    /// The first snapshot is diffed against no document, so everything in it
    /// shows as created. Each ChangeSet is stamped with the later snapshot's
    /// capture time.
    ///
    /// # Errors
    ///
    /// Returns load errors, or `ERR_DUPLICATE_IDENTITY` from the diff.
    pub fn history(&self, options: &DiffOptions) -> Result<Vec<ChangeSet>> {
        let start = Instant::now();
        log_op_start!("snapshot_history", root = %self.root.display());

        let mut history = Vec::new();
        let mut previous: Option<Snapshot> = None;
        for (_, path) in self.entries()? {
            let current = self.load(&path)?;
            let mut changes = diff_with_options(previous.as_ref(), Some(&current), "", options)?;
            changes.timestamp = current.timestamp();
            history.push(changes);
            previous = Some(current);
        }

        log_op_end!(
            "snapshot_history",
            duration_ms = start.elapsed().as_millis() as u64,
            steps = history.len()
        );
        Ok(history)
    }
}
