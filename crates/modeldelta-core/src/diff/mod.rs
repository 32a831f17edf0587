//! Snapshot diff engine.
//!
//! Compares two [`Snapshot`](crate::snapshot::Snapshot)s and produces a
//! [`ChangeSet`] of created, modified and deleted entities.
//!
//! ## Entry point
//!
//! ```ignore
//! use modeldelta_core::diff::{diff, format_change_set};
//!
//! let changes = diff(before.as_ref(), after.as_ref(), code)?;
//! println!("{}", format_change_set(&changes));
//! ```
//!
//! ## Guarantees
//!
//! - **Identity join**: entities are matched by id, never by label.
//! - **Partition**: every id lands in at most one of created / modified /
//!   deleted; unchanged entities are omitted. A type change under a stable id
//!   is the one exception and is reported as delete + create.
//! - **Determinism**: list order follows the `after` snapshot (`before` for
//!   deletions); property changes are in name order with synthetic placement
//!   entries last.
//! - **Fail fast**: a duplicate id in either input is an error, never a
//!   silent pick.

pub mod dimensions;
pub mod engine;
pub mod format;
pub mod model;
pub mod options;
pub mod record;

pub use dimensions::extract_dimensions;
pub use engine::{compare_properties, compare_properties_with, diff, diff_with_options};
pub use format::{
    format_change_set, format_entity_change, format_property_change, friendly_type, NO_CHANGES,
};
pub use model::{ChangeKind, ChangeSet, EntityChange, PropertyChange};
pub use options::{DiffOptions, RotationPolicy, DEFAULT_IGNORED_PROPERTIES};
pub use record::{ChangeSetRecord, EntityChangeRecord, PropertyChangeRecord};
