//! Persisted snapshot document.
//!
//! One JSON document per snapshot:
//!
//! ```text
//! {
//!   "timestamp": "2024-05-01T10:00:00+00:00",
//!   "document": {"name": .., "filename": .., "modified": ..},
//!   "environment": {..},
//!   "object_count": 3,
//!   "objects": [ Entity, .. ],
//!   "dependency_graph": {"roots": [..], "tree": {..}}
//! }
//! ```
//!
//! `dependency_graph` is written for external readers and recomputed on load.

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_snapshot, serialization_error, Result};
use chrono::{DateTime, Utc};
use modeldelta_core::errors::SnapshotError;
use modeldelta_core::snapshot::timestamp::lenient;
use modeldelta_core::snapshot::{DependencyGraph, DocumentInfo, Entity, Snapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotFile {
    #[serde(with = "lenient")]
    pub timestamp: DateTime<Utc>,
    pub document: DocumentInfo,
    #[serde(default)]
    pub environment: BTreeMap<String, serde_json::Value>,
    pub object_count: usize,
    pub objects: Vec<Entity>,
    #[serde(default)]
    pub dependency_graph: DependencyGraph,
}

impl From<&Snapshot> for SnapshotFile {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp(),
            document: snapshot.document().clone(),
            environment: snapshot.environment().clone(),
            object_count: snapshot.len(),
            objects: snapshot.entities().to_vec(),
            dependency_graph: snapshot.dependency_graph(),
        }
    }
}

impl SnapshotFile {
    /// Convert into an in-memory snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::ObjectCountMismatch`] if `object_count`
    /// disagrees with `objects`.
    pub fn into_snapshot(self) -> std::result::Result<Snapshot, SnapshotError> {
        if self.object_count != self.objects.len() {
            return Err(SnapshotError::ObjectCountMismatch {
                declared: self.object_count,
                actual: self.objects.len(),
            });
        }
        Ok(
            Snapshot::captured_at(self.timestamp, self.document, self.objects)
                .with_environment(self.environment),
        )
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ERR_SERIALIZATION` if serialization fails.
    pub fn to_json(&self, path: &Path) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| serialization_error("save_snapshot", path, e))
    }

    /// Parse and check a persisted document. `path` is used for error context.
    ///
    /// # Errors
    ///
    /// - `ERR_SERIALIZATION` if the bytes are not a snapshot document
    /// - `ERR_INVALID_SNAPSHOT` if `object_count` does not match
    pub fn parse(bytes: &[u8], path: &Path) -> Result<Snapshot> {
        let file: SnapshotFile =
            serde_json::from_slice(bytes).map_err(|e| serialization_error("load_snapshot", path, e))?;
        file.into_snapshot().map_err(|e| invalid_snapshot(path, e))
    }
}
