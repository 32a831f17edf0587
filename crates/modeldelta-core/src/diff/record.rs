//! Serialized ChangeSet form for session logs and replay.
//!
//! Every record carries its precomputed `display_text`, so readers can render
//! history without running the formatter.

use crate::diff::format::{format_entity_change, format_property_change};
use crate::diff::model::{ChangeKind, ChangeSet, EntityChange, PropertyChange};
use crate::snapshot::timestamp::lenient;
use crate::value::PropertyValue;
use chrono::{DateTime, Utc};
use modeldelta_core_types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChangeRecord {
    pub property_name: String,
    #[serde(default)]
    pub old_value: Option<PropertyValue>,
    #[serde(default)]
    pub new_value: Option<PropertyValue>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub display_text: String,
}

impl From<&PropertyChange> for PropertyChangeRecord {
    fn from(change: &PropertyChange) -> Self {
        Self {
            property_name: change.property_name.clone(),
            old_value: change.old.clone(),
            new_value: change.new.clone(),
            unit: change.unit.clone(),
            display_text: format_property_change(change),
        }
    }
}

impl From<PropertyChangeRecord> for PropertyChange {
    fn from(record: PropertyChangeRecord) -> Self {
        PropertyChange::new(
            record.property_name,
            record.old_value,
            record.new_value,
            record.unit,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityChangeRecord {
    pub object_id: EntityId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub type_tag: String,
    pub kind: ChangeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_changes: Option<Vec<PropertyChangeRecord>>,
    #[serde(default)]
    pub display_text: String,
}

impl From<&EntityChange> for EntityChangeRecord {
    fn from(change: &EntityChange) -> Self {
        Self {
            object_id: change.id.clone(),
            label: change.label.clone(),
            type_tag: change.type_tag.clone(),
            kind: change.kind,
            dimensions: (change.kind == ChangeKind::Created)
                .then(|| change.extracted_dimensions.clone()),
            property_changes: (change.kind == ChangeKind::Modified).then(|| {
                change
                    .property_changes
                    .iter()
                    .map(PropertyChangeRecord::from)
                    .collect()
            }),
            display_text: format_entity_change(change),
        }
    }
}

impl EntityChangeRecord {
    /// Rebuild the change. `kind` is the list the record was stored in.
    fn into_change(self, kind: ChangeKind) -> EntityChange {
        EntityChange {
            id: self.object_id,
            label: self.label,
            type_tag: self.type_tag,
            kind,
            extracted_dimensions: self.dimensions.unwrap_or_default(),
            property_changes: self
                .property_changes
                .unwrap_or_default()
                .into_iter()
                .map(PropertyChange::from)
                .collect(),
        }
    }
}

fn default_success() -> bool {
    true
}

/// `{created, modified, deleted, code, timestamp, execution_success, execution_message}`.
///
/// ```
/// use modeldelta_core::diff::{diff, ChangeSetRecord};
/// use modeldelta_core::snapshot::{DocumentInfo, Entity, Snapshot};
///
/// let after = Snapshot::new(
///     DocumentInfo::named("Doc"),
///     vec![Entity::new("Box", "Box", "Part::Box")],
/// );
/// let changes = diff(None, Some(&after), "box()").unwrap();
/// let json = serde_json::to_string(&ChangeSetRecord::from(&changes)).unwrap();
/// let replayed: ChangeSetRecord = serde_json::from_str(&json).unwrap();
/// assert_eq!(replayed.into_change_set(), changes);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSetRecord {
    #[serde(default)]
    pub created: Vec<EntityChangeRecord>,
    #[serde(default)]
    pub modified: Vec<EntityChangeRecord>,
    #[serde(default)]
    pub deleted: Vec<EntityChangeRecord>,
    #[serde(default)]
    pub code: String,
    #[serde(with = "lenient")]
    pub timestamp: DateTime<Utc>,
    #[serde(default = "default_success")]
    pub execution_success: bool,
    #[serde(default)]
    pub execution_message: String,
}

impl From<&ChangeSet> for ChangeSetRecord {
    fn from(changes: &ChangeSet) -> Self {
        let records = |list: &[EntityChange]| -> Vec<EntityChangeRecord> {
            list.iter().map(EntityChangeRecord::from).collect()
        };
        Self {
            created: records(changes.created.as_slice()),
            modified: records(changes.modified.as_slice()),
            deleted: records(changes.deleted.as_slice()),
            code: changes.executed_code.clone(),
            timestamp: changes.timestamp,
            execution_success: changes.execution_success,
            execution_message: changes.execution_message.clone(),
        }
    }
}

impl ChangeSetRecord {
    /// Rebuild the in-memory ChangeSet for replay.
    pub fn into_change_set(self) -> ChangeSet {
        let rebuild = |list: Vec<EntityChangeRecord>, kind: ChangeKind| -> Vec<EntityChange> {
            list.into_iter().map(|r| r.into_change(kind)).collect()
        };
        ChangeSet {
            created: rebuild(self.created, ChangeKind::Created),
            modified: rebuild(self.modified, ChangeKind::Modified),
            deleted: rebuild(self.deleted, ChangeKind::Deleted),
            executed_code: self.code,
            timestamp: self.timestamp,
            execution_success: self.execution_success,
            execution_message: self.execution_message,
        }
    }

    /// Stored display lines with `+` / `~` / `-` prefixes, without
    /// re-running the formatter.
    pub fn display_lines(&self) -> Vec<String> {
        let prefixed = |list: &[EntityChangeRecord], kind: ChangeKind| {
            list.iter()
                .map(move |r| format!("{} {}", kind.prefix(), r.display_text))
                .collect::<Vec<_>>()
        };
        let mut lines = prefixed(self.created.as_slice(), ChangeKind::Created);
        lines.extend(prefixed(self.modified.as_slice(), ChangeKind::Modified));
        lines.extend(prefixed(self.deleted.as_slice(), ChangeKind::Deleted));
        lines
    }
}
