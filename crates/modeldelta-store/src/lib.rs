//! ModelDelta Store - file persistence for snapshots and change history
//!
//! Provides:
//! - The persisted snapshot JSON document (`SnapshotFile`)
//! - Per-document snapshot directories with counter-numbered files
//! - History reconstruction by diffing consecutive saved snapshots
//! - An explicit change-journal accumulator with defined flush points

pub mod atomic;
pub mod change_journal;
pub mod errors;
pub mod snapshot_dir;
pub mod snapshot_file;

// Re-export key types
pub use change_journal::ChangeJournal;
pub use errors::Result;
pub use snapshot_dir::{SnapshotDir, SnapshotSummary};
pub use snapshot_file::SnapshotFile;
