//! Snapshot model.
//!
//! A [`Snapshot`] is an immutable capture of a whole modeling document:
//! its entities, their properties, placement, shape and sketch summaries,
//! expressions and dependency edges.
//!
//! ## Responsibilities
//!
//! - Define the entity / snapshot data model and its JSON layout
//! - Derive the dependency graph and content digest
//! - Render a reconstruction script for a snapshot
//!
//! ## Non-Responsibilities
//!
//! - Reading from a live host (see [`crate::capture`])
//! - File persistence (handled by `modeldelta-store`)

pub mod digest;
pub mod graph;
pub mod model;
pub mod script;
pub mod timestamp;

pub use digest::content_digest;
pub use graph::DependencyGraph;
pub use model::{
    BoundingBox, Dependencies, DocumentInfo, Entity, ExpressionBinding, Placement, ShapeSummary,
    SketchConstraint, SketchGeometry, SketchSummary, Snapshot, TopologyCounts,
    MAX_CAPTURED_VERTICES,
};
pub use script::{reconstruction_script, SCRIPT_SUFFIX};
pub use timestamp::parse_timestamp;
