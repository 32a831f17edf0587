//! Canonical schema constants for structured logging
//!
//! These constants keep field keys and event names consistent between the
//! diff engine, the store and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Document / entity identifiers
pub const FIELD_DOCUMENT: &str = "document";
pub const FIELD_ENTITY_ID: &str = "entity_id";

// Change counts
pub const FIELD_CREATED: &str = "created";
pub const FIELD_MODIFIED: &str = "modified";
pub const FIELD_DELETED: &str = "deleted";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
