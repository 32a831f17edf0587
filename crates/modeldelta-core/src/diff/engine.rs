//! Snapshot diff computation engine.
//!
//! Entities are joined on [`EntityId`], never on label. The engine is pure:
//! no I/O, no shared state, and the inputs are only borrowed.

#![allow(clippy::result_large_err)]

use crate::diff::model::{ChangeSet, EntityChange, PropertyChange};
use crate::diff::options::{DiffOptions, RotationPolicy};
use crate::errors::{ExError, Result, SnapshotError};
use crate::snapshot::{Entity, Snapshot};
use crate::value::{values_equal_within, PropertyValue};
use crate::{log_op_end, log_op_error, log_op_start};
use modeldelta_core_types::EntityId;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

const OP_DIFF: &str = "diff_snapshots";

/// Synthetic property name for placement translation.
pub const POSITION_PROPERTY: &str = "Position";
/// Synthetic property name for placement rotation.
pub const ROTATION_PROPERTY: &str = "Rotation";

/// Compare two snapshots with [`DiffOptions::default`].
///
/// `None` stands for "no document": a `None` before makes everything in
/// `after` created, a `None` after makes everything in `before` deleted.
///
/// # Errors
///
/// Returns `ERR_DUPLICATE_IDENTITY` if either snapshot contains the same
/// entity id twice. The error carries the id and the side (`before` /
/// `after`).
///
/// # Example
///
/// ```
/// use modeldelta_core::diff::diff;
/// use modeldelta_core::snapshot::{DocumentInfo, Entity, Snapshot};
///
/// let after = Snapshot::new(
///     DocumentInfo::named("Doc"),
///     vec![Entity::new("Box", "Box", "Part::Box").with_property("Length", 10.0)],
/// );
/// let changes = diff(None, Some(&after), "make_box()").unwrap();
/// assert_eq!(changes.created.len(), 1);
/// ```
pub fn diff(
    before: Option<&Snapshot>,
    after: Option<&Snapshot>,
    executed_code: &str,
) -> Result<ChangeSet> {
    diff_with_options(before, after, executed_code, &DiffOptions::default())
}

/// [`diff`] with explicit options.
///
/// # Errors
///
/// Same as [`diff`].
pub fn diff_with_options(
    before: Option<&Snapshot>,
    after: Option<&Snapshot>,
    executed_code: &str,
    options: &DiffOptions,
) -> Result<ChangeSet> {
    let start = Instant::now();
    let document = after.or(before).map(Snapshot::document_name).unwrap_or("");
    log_op_start!(OP_DIFF, document = document);

    match classify(before, after, executed_code, options) {
        Ok(changes) => {
            log_op_end!(
                OP_DIFF,
                duration_ms = start.elapsed().as_millis() as u64,
                created = changes.created.len(),
                modified = changes.modified.len(),
                deleted = changes.deleted.len()
            );
            Ok(changes)
        }
        Err(err) => {
            log_op_error!(
                OP_DIFF,
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                entity_id = err.entity_id().unwrap_or_default()
            );
            Err(err)
        }
    }
}

fn classify(
    before: Option<&Snapshot>,
    after: Option<&Snapshot>,
    executed_code: &str,
    options: &DiffOptions,
) -> Result<ChangeSet> {
    let before_index = index_entities(before, "before")?;
    let after_index = index_entities(after, "after")?;

    let mut changes = ChangeSet::empty(executed_code);

    if let (Some(b), Some(a)) = (before, after) {
        if digests_match(b, a) {
            return Ok(changes);
        }
    }

    let after_entities = after.map(Snapshot::entities).unwrap_or_default();
    let before_entities = before.map(Snapshot::entities).unwrap_or_default();

    for entity in after_entities {
        match before_index.get(&entity.id) {
            None => changes.created.push(EntityChange::created(entity)),
            Some(old) if old.type_tag != entity.type_tag => {
                tracing::debug!(
                    op = OP_DIFF,
                    entity_id = %entity.id,
                    old_type = %old.type_tag,
                    new_type = %entity.type_tag,
                    "type changed under stable id, reporting delete + create"
                );
                changes.created.push(EntityChange::created(entity));
            }
            Some(old) => {
                let property_changes = compare_properties_with(old, entity, options);
                if !property_changes.is_empty() {
                    changes
                        .modified
                        .push(EntityChange::modified(entity, property_changes));
                }
            }
        }
    }

    for entity in before_entities {
        match after_index.get(&entity.id) {
            Some(new) if new.type_tag == entity.type_tag => {}
            _ => changes.deleted.push(EntityChange::deleted(entity)),
        }
    }

    Ok(changes)
}

/// Fast path for identical content. JSON writes NaN and infinities as
/// `null`, so the digest only decides equality when every compared value is
/// finite.
fn digests_match(before: &Snapshot, after: &Snapshot) -> bool {
    if before.has_non_finite_values() || after.has_non_finite_values() {
        return false;
    }
    match (before.content_digest(), after.content_digest()) {
        (Ok(bd), Ok(ad)) if bd == ad => {
            tracing::debug!(op = OP_DIFF, digest = %ad, "content digests match");
            true
        }
        _ => false,
    }
}

fn index_entities<'a>(
    snapshot: Option<&'a Snapshot>,
    side: &str,
) -> Result<HashMap<&'a EntityId, &'a Entity>> {
    let mut index = HashMap::new();
    let Some(snapshot) = snapshot else {
        return Ok(index);
    };
    for entity in snapshot.entities() {
        if index.insert(&entity.id, entity).is_some() {
            return Err(ExError::from(SnapshotError::DuplicateIdentity {
                id: entity.id.clone(),
                document: snapshot.document_name().to_string(),
            })
            .with_op(OP_DIFF)
            .with_side(side));
        }
    }
    Ok(index)
}

/// Property-level comparison with [`DiffOptions::default`].
pub fn compare_properties(before: &Entity, after: &Entity) -> Vec<PropertyChange> {
    compare_properties_with(before, after, &DiffOptions::default())
}

/// Property-level comparison of two versions of one entity.
///
/// Ordinary properties come first in name order, then the synthetic
/// `Position` and (under [`RotationPolicy::Symmetric`]) `Rotation` entries.
/// The placement checks are skipped unless both sides have a placement.
pub fn compare_properties_with(
    before: &Entity,
    after: &Entity,
    options: &DiffOptions,
) -> Vec<PropertyChange> {
    let names: BTreeSet<&str> = before
        .properties
        .keys()
        .chain(after.properties.keys())
        .map(String::as_str)
        .filter(|name| !options.is_ignored(name))
        .collect();

    let mut changes = Vec::new();
    for name in names {
        let old = before.property(name);
        let new = after.property(name);
        let old_value = old.map(|p| &p.value);
        let new_value = new.map(|p| &p.value);
        if values_equal_within(old_value, new_value, options.tolerance) {
            continue;
        }
        // Unit from the after side, falling back to before; display only
        let unit = new
            .and_then(|p| p.display_unit())
            .or_else(|| old.and_then(|p| p.display_unit()))
            .unwrap_or_default();
        changes.push(PropertyChange::new(
            name,
            old_value.cloned(),
            new_value.cloned(),
            unit,
        ));
    }

    if let (Some(old), Some(new)) = (&before.placement, &after.placement) {
        if !old.position.approx_eq(&new.position, options.tolerance) {
            changes.push(PropertyChange::new(
                POSITION_PROPERTY,
                Some(PropertyValue::Vector3(old.position)),
                Some(PropertyValue::Vector3(new.position)),
                "mm",
            ));
        }
        if options.rotation == RotationPolicy::Symmetric
            && !old.rotation.approx_eq(&new.rotation, options.tolerance)
        {
            changes.push(PropertyChange::new(
                ROTATION_PROPERTY,
                Some(PropertyValue::Rotation(old.rotation)),
                Some(PropertyValue::Rotation(new.rotation)),
                "",
            ));
        }
    }

    changes
}
