//! Content digest for snapshots.
//!
//! The digest covers the entity list only. `captured_at`, the environment map
//! and document metadata are excluded, so two captures of an unchanged
//! document hash the same.
//!
//! ## Determinism
//!
//! - Same entities in the same order → same digest
//! - Reordered entities → different digest (the diff engine then falls back
//!   to a full comparison, which is order-independent)
//! - NaN and infinities serialize as `null`, so they all hash alike. The diff
//!   engine skips the digest for snapshots holding non-finite values.

use crate::errors::Result;
use crate::snapshot::model::Snapshot;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the canonical JSON of the snapshot's entities.
///
/// # Errors
///
/// Returns `ERR_SERIALIZATION` if the entities cannot be serialized.
///
/// ```
/// use modeldelta_core::snapshot::{content_digest, DocumentInfo, Entity, Snapshot};
///
/// let snapshot = Snapshot::new(
///     DocumentInfo::named("Doc"),
///     vec![Entity::new("Box", "Box", "Part::Box")],
/// );
/// assert_eq!(content_digest(&snapshot).unwrap().len(), 64);
/// ```
pub fn content_digest(snapshot: &Snapshot) -> Result<String> {
    let canonical = serde_json::to_string(snapshot.entities())?;
    Ok(hash_string(&canonical))
}

fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::model::{DocumentInfo, Entity};
    use chrono::{TimeZone, Utc};

    fn boxes() -> Vec<Entity> {
        vec![Entity::new("Box", "Box", "Part::Box").with_property("Length", 10.0)]
    }

    #[test]
    fn test_digest_ignores_capture_time() {
        let a = Snapshot::captured_at(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            DocumentInfo::named("Doc"),
            boxes(),
        );
        let b = Snapshot::captured_at(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
            DocumentInfo::named("Doc"),
            boxes(),
        );
        assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = Snapshot::new(DocumentInfo::named("Doc"), boxes());
        let b = Snapshot::new(
            DocumentInfo::named("Doc"),
            vec![Entity::new("Box", "Box", "Part::Box").with_property("Length", 11.0)],
        );
        assert_ne!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
    }

    #[test]
    fn test_non_finite_values_collide() {
        let with = |length: f64| {
            Snapshot::new(
                DocumentInfo::named("Doc"),
                vec![Entity::new("Box", "Box", "Part::Box").with_property("Length", length)],
            )
        };
        let a = with(f64::INFINITY);
        let b = with(f64::NAN);
        assert_eq!(content_digest(&a).unwrap(), content_digest(&b).unwrap());
        assert!(a.has_non_finite_values());
    }

    #[test]
    fn test_hash_string_deterministic() {
        let hash1 = hash_string("test");
        let hash2 = hash_string("test");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }
}
