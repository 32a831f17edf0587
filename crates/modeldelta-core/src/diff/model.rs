//! ChangeSet output types.
//!
//! A [`ChangeSet`] partitions the entities of two snapshots into created,
//! modified and deleted lists. Unchanged entities appear in none of them.

use crate::diff::dimensions::extract_dimensions;
use crate::snapshot::Entity;
use crate::value::PropertyValue;
use chrono::{DateTime, Utc};
use modeldelta_core_types::EntityId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How an entity changed between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Modified,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }

    /// Line prefix used by change summaries.
    pub fn prefix(&self) -> char {
        match self {
            ChangeKind::Created => '+',
            ChangeKind::Modified => '~',
            ChangeKind::Deleted => '-',
        }
    }
}

/// One differing property. A `None` side means the property was absent there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyChange {
    pub property_name: String,
    pub old: Option<PropertyValue>,
    pub new: Option<PropertyValue>,
    /// Display unit; empty when unitless.
    pub unit: String,
}

impl PropertyChange {
    pub fn new(
        property_name: impl Into<String>,
        old: Option<PropertyValue>,
        new: Option<PropertyValue>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            old,
            new,
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntityChange {
    pub id: EntityId,
    pub label: String,
    pub type_tag: String,
    pub kind: ChangeKind,
    /// Headline dimensions; populated for `Created` only.
    pub extracted_dimensions: BTreeMap<String, f64>,
    /// Populated for `Modified` only.
    pub property_changes: Vec<PropertyChange>,
}

impl EntityChange {
    pub fn created(entity: &Entity) -> Self {
        let mut change = Self::bare(entity, ChangeKind::Created);
        change.extracted_dimensions = extract_dimensions(&entity.properties, entity.shape.as_ref());
        change
    }

    pub fn modified(entity: &Entity, property_changes: Vec<PropertyChange>) -> Self {
        let mut change = Self::bare(entity, ChangeKind::Modified);
        change.property_changes = property_changes;
        change
    }

    pub fn deleted(entity: &Entity) -> Self {
        Self::bare(entity, ChangeKind::Deleted)
    }

    fn bare(entity: &Entity, kind: ChangeKind) -> Self {
        Self {
            id: entity.id.clone(),
            label: entity.label.clone(),
            type_tag: entity.type_tag.clone(),
            kind,
            extracted_dimensions: BTreeMap::new(),
            property_changes: Vec::new(),
        }
    }

    /// Label for display; falls back to the id when the label is empty.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.id.as_str()
        } else {
            &self.label
        }
    }
}

/// Result of comparing two snapshots around one executed script.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    pub created: Vec<EntityChange>,
    pub modified: Vec<EntityChange>,
    pub deleted: Vec<EntityChange>,
    pub executed_code: String,
    pub timestamp: DateTime<Utc>,
    pub execution_success: bool,
    pub execution_message: String,
}

impl ChangeSet {
    /// An empty ChangeSet stamped now.
    pub fn empty(executed_code: impl Into<String>) -> Self {
        Self {
            created: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
            executed_code: executed_code.into(),
            timestamp: Utc::now(),
            execution_success: true,
            execution_message: String::new(),
        }
    }

    /// Record how the script that produced these changes finished.
    pub fn with_execution_outcome(mut self, success: bool, message: impl Into<String>) -> Self {
        self.execution_success = success;
        self.execution_message = message.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    pub fn total_changes(&self) -> usize {
        self.created.len() + self.modified.len() + self.deleted.len()
    }

    /// All changes: created, then modified, then deleted.
    pub fn iter(&self) -> impl Iterator<Item = &EntityChange> {
        self.created
            .iter()
            .chain(self.modified.iter())
            .chain(self.deleted.iter())
    }

    /// Find the change recorded for `id` with the given kind.
    pub fn find(&self, id: &EntityId, kind: ChangeKind) -> Option<&EntityChange> {
        let list = match kind {
            ChangeKind::Created => &self.created,
            ChangeKind::Modified => &self.modified,
            ChangeKind::Deleted => &self.deleted,
        };
        list.iter().find(|c| &c.id == id)
    }

    /// One line per change, see [`format_change_set`](crate::diff::format::format_change_set).
    pub fn summary(&self) -> String {
        crate::diff::format::format_change_set(self)
    }
}
