//! ModelDelta Core - snapshot and change-tracking kernel
//!
//! This crate provides the in-memory side of document change tracking:
//! - Closed property value model with tolerance-based equality
//! - Immutable document snapshots (entities, placements, shape and sketch summaries)
//! - Capture boundary trait for host environments
//! - Identity-keyed diff engine producing created / modified / deleted ChangeSets
//! - Human-readable change summaries and a serializable ChangeSet record
//!
//! Persistence lives in `modeldelta-store`.

pub mod capture;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod snapshot;
pub mod value;

pub use modeldelta_core_types as core_types;

// Re-export commonly used types
pub use capture::{track_changes, SnapshotSource, TrackedRun};
pub use diff::{
    diff, diff_with_options, format_change_set, format_entity_change, ChangeKind, ChangeSet,
    ChangeSetRecord, DiffOptions, EntityChange, PropertyChange, RotationPolicy,
};
pub use errors::{ExError, ExErrorKind, Result, SnapshotError};
pub use modeldelta_core_types::EntityId;
pub use snapshot::{DocumentInfo, Entity, Placement, ShapeSummary, SketchSummary, Snapshot};
pub use value::{values_equal, Property, PropertyValue, Rotation, Vector3};
