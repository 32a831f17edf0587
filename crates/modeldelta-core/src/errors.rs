use modeldelta_core_types::EntityId;
use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Snapshot input
    /// Two entities in one snapshot share an id
    DuplicateIdentity,
    /// A snapshot document is structurally inconsistent (e.g. `object_count` mismatch)
    InvalidSnapshot,
    NotFound,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::DuplicateIdentity => "ERR_DUPLICATE_IDENTITY",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus optional context
/// (operation, entity, snapshot side) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    side: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            side: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add which snapshot ("before" / "after") the error refers to
    pub fn with_side(mut self, side: impl Into<String>) -> Self {
        self.side = Some(side.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the snapshot side context, if any
    pub fn side(&self) -> Option<&str> {
        self.side.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(side) = &self.side {
            write!(f, " (side: {})", side)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Structural problems found while validating a snapshot
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// Two entities share the same id
    #[error("Duplicate entity id {id} in document {document}")]
    DuplicateIdentity { id: EntityId, document: String },

    /// Persisted `object_count` disagrees with the entity list
    #[error("Snapshot declares {declared} objects but contains {actual}")]
    ObjectCountMismatch { declared: usize, actual: usize },

    /// Timestamp could not be parsed
    #[error("Invalid snapshot timestamp: {value}")]
    InvalidTimestamp { value: String },
}

impl From<SnapshotError> for ExError {
    fn from(err: SnapshotError) -> Self {
        let message = err.to_string();
        match err {
            SnapshotError::DuplicateIdentity { id, .. } => {
                ExError::new(ExErrorKind::DuplicateIdentity)
                    .with_entity_id(id.as_str())
                    .with_message(message)
            }
            SnapshotError::ObjectCountMismatch { .. } => {
                ExError::new(ExErrorKind::InvalidSnapshot).with_message(message)
            }
            SnapshotError::InvalidTimestamp { .. } => {
                ExError::new(ExErrorKind::InvalidSnapshot).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization).with_message(err.to_string())
    }
}
