//! Core types shared across modeldelta crates
//!
//! This crate provides the leaf types used by both the diff engine and the
//! persistence layer:
//!
//! - **Identity types**: `EntityId`, the join key between snapshots
//! - **Schema constants**: Canonical field keys and event names for logging

pub mod identity;
pub mod schema;

pub use identity::EntityId;
