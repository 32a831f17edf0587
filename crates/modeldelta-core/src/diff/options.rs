//! Diff configuration.

use crate::value::DEFAULT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Presentational / internal property names that never represent modeling
/// intent.
pub const DEFAULT_IGNORED_PROPERTIES: &[&str] =
    &["Label", "Label2", "ExpressionEngine", "Proxy", "ViewObject"];

/// Whether placement rotation gets the same synthetic check as position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Emit a synthetic `Rotation` change next to `Position`.
    #[default]
    Symmetric,
    /// Diff translation only.
    TranslationOnly,
}

/// Knobs for [`diff_with_options`](crate::diff::diff_with_options).
///
/// Every field has a default, so a partial JSON object deserializes:
///
/// ```
/// use modeldelta_core::diff::{DiffOptions, RotationPolicy};
///
/// let options: DiffOptions = serde_json::from_str(r#"{"rotation": "translation_only"}"#).unwrap();
/// assert_eq!(options.rotation, RotationPolicy::TranslationOnly);
/// assert_eq!(options.tolerance, 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    pub tolerance: f64,
    pub ignored_properties: BTreeSet<String>,
    pub rotation: RotationPolicy,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            ignored_properties: DEFAULT_IGNORED_PROPERTIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rotation: RotationPolicy::default(),
        }
    }
}

impl DiffOptions {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }

    /// Add a name to the denylist.
    pub fn ignore(mut self, property: impl Into<String>) -> Self {
        self.ignored_properties.insert(property.into());
        self
    }

    /// Remove a name from the denylist.
    pub fn track(mut self, property: &str) -> Self {
        self.ignored_properties.remove(property);
        self
    }

    pub fn is_ignored(&self, property: &str) -> bool {
        self.ignored_properties.contains(property)
    }
}
