//! Human-readable change summaries.
//!
//! Formatting never fails: missing labels fall back to ids, missing type
//! tags to a generic name, absent values to `None`.

use crate::diff::dimensions::{dimension_unit, DIMENSION_NAMES};
use crate::diff::model::{ChangeKind, ChangeSet, EntityChange, PropertyChange};
use crate::value::PropertyValue;
use std::collections::BTreeMap;

/// Returned by [`format_change_set`] for an empty ChangeSet.
pub const NO_CHANGES: &str = "No changes detected";

/// Property changes shown on one `Modified` line.
pub const SUMMARY_PROPERTY_LIMIT: usize = 3;

const SUMMARY_DIMENSION_LIMIT: usize = 3;

const FRIENDLY_TYPES: &[(&str, &str)] = &[
    ("Part::Box", "Box"),
    ("Part::Cylinder", "Cylinder"),
    ("Part::Sphere", "Sphere"),
    ("Part::Cone", "Cone"),
    ("Part::Torus", "Torus"),
    ("Part::Feature", "Shape"),
    ("Part::Cut", "Cut"),
    ("Part::Fuse", "Fusion"),
    ("Part::Common", "Intersection"),
    ("Part::Extrusion", "Extrusion"),
    ("Part::Revolution", "Revolution"),
    ("Sketcher::SketchObject", "Sketch"),
    ("PartDesign::Body", "Body"),
    ("PartDesign::Pad", "Pad"),
    ("PartDesign::Pocket", "Pocket"),
    ("PartDesign::Fillet", "Fillet"),
    ("PartDesign::Chamfer", "Chamfer"),
    ("Spreadsheet::Sheet", "Spreadsheet"),
];

/// Short display name for an internal type tag.
///
/// Unknown tags fall back to their last `::` segment.
///
/// ```
/// use modeldelta_core::diff::friendly_type;
///
/// assert_eq!(friendly_type("Part::Fuse"), "Fusion");
/// assert_eq!(friendly_type("Arch::Wall"), "Wall");
/// ```
pub fn friendly_type(type_tag: &str) -> &str {
    if let Some((_, name)) = FRIENDLY_TYPES.iter().find(|(tag, _)| *tag == type_tag) {
        return name;
    }
    match type_tag.rsplit("::").next() {
        Some(last) if !last.is_empty() => last,
        _ => "Object",
    }
}

fn format_value(value: Option<&PropertyValue>, unit: &str) -> String {
    match value {
        None => "None".to_string(),
        Some(v) if unit.is_empty() => v.to_string(),
        Some(v) => format!("{} {}", v, unit),
    }
}

/// `"{name}: {old} {unit} -> {new} {unit}"`.
///
/// Numbers render to 2 decimals, vectors as `(x, y, z)` to 1 decimal.
pub fn format_property_change(change: &PropertyChange) -> String {
    format!(
        "{}: {} -> {}",
        change.property_name,
        format_value(change.old.as_ref(), &change.unit),
        format_value(change.new.as_ref(), &change.unit)
    )
}

/// Well-known names render bare and joined with `x`. A map holding none of
/// them renders its first entries with their names, joined with commas.
fn format_dimensions(dims: &BTreeMap<String, f64>) -> String {
    let known: Vec<String> = DIMENSION_NAMES
        .iter()
        .filter_map(|name| dims.get(*name).map(|v| (*name, *v)))
        .take(SUMMARY_DIMENSION_LIMIT)
        .map(|(name, v)| format!("{:.1}{}", v, dimension_unit(name)))
        .collect();
    if !known.is_empty() {
        return known.join(" x ");
    }

    dims.iter()
        .take(SUMMARY_DIMENSION_LIMIT)
        .map(|(name, v)| format!("{}: {:.1}{}", name, v, dimension_unit(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line description of an entity change.
///
/// ```
/// use modeldelta_core::diff::{format_entity_change, EntityChange};
/// use modeldelta_core::snapshot::Entity;
///
/// let entity = Entity::new("Box", "Box1", "Part::Box")
///     .with_property("Length", 100.0)
///     .with_property("Width", 50.0)
///     .with_property("Height", 20.0);
/// assert_eq!(
///     format_entity_change(&EntityChange::created(&entity)),
///     "Created Box1 (Box: 100.0mm x 50.0mm x 20.0mm)"
/// );
/// ```
pub fn format_entity_change(change: &EntityChange) -> String {
    let label = change.display_label();
    let kind_name = friendly_type(&change.type_tag);
    match change.kind {
        ChangeKind::Created => {
            if change.extracted_dimensions.is_empty() {
                format!("Created {} ({})", label, kind_name)
            } else {
                format!(
                    "Created {} ({}: {})",
                    label,
                    kind_name,
                    format_dimensions(&change.extracted_dimensions)
                )
            }
        }
        ChangeKind::Deleted => format!("Deleted {} ({})", label, kind_name),
        ChangeKind::Modified => {
            if change.property_changes.is_empty() {
                return format!("Modified {}", label);
            }
            let shown = change
                .property_changes
                .iter()
                .take(SUMMARY_PROPERTY_LIMIT)
                .map(format_property_change)
                .collect::<Vec<_>>()
                .join(", ");
            format!("Modified {}: {}", label, shown)
        }
    }
}

/// One `+` / `~` / `-` prefixed line per change, or [`NO_CHANGES`].
pub fn format_change_set(changes: &ChangeSet) -> String {
    if changes.is_empty() {
        return NO_CHANGES.to_string();
    }
    changes
        .iter()
        .map(|c| format!("{} {}", c.kind.prefix(), format_entity_change(c)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Entity;
    use crate::value::{Rotation, Vector3};

    #[test]
    fn test_friendly_type_fallbacks() {
        assert_eq!(friendly_type("Sketcher::SketchObject"), "Sketch");
        assert_eq!(friendly_type("Mesh::Feature"), "Feature");
        assert_eq!(friendly_type("Custom"), "Custom");
        assert_eq!(friendly_type(""), "Object");
    }

    #[test]
    fn test_property_change_rendering() {
        let number = PropertyChange::new(
            "Length",
            Some(PropertyValue::Number(10.0)),
            Some(PropertyValue::Number(12.346)),
            "mm",
        );
        assert_eq!(
            format_property_change(&number),
            "Length: 10.00 mm -> 12.35 mm"
        );

        let appeared = PropertyChange::new("Tip", None, Some(PropertyValue::from("Pad")), "");
        assert_eq!(format_property_change(&appeared), "Tip: None -> Pad");

        let rotation = PropertyChange::new(
            "Rotation",
            Some(PropertyValue::Rotation(Rotation::identity())),
            Some(PropertyValue::Rotation(Rotation::from_degrees(
                Vector3::new(0.0, 0.0, 1.0),
                90.0,
            ))),
            "",
        );
        assert_eq!(
            format_property_change(&rotation),
            "Rotation: 0.0° about (0.0, 0.0, 1.0) -> 90.0° about (0.0, 0.0, 1.0)"
        );
    }

    #[test]
    fn test_created_without_dimensions() {
        let entity = Entity::new("Sketch", "Sketch", "Sketcher::SketchObject");
        assert_eq!(
            format_entity_change(&EntityChange::created(&entity)),
            "Created Sketch (Sketch)"
        );
    }

    #[test]
    fn test_created_dimensions_capped_and_ordered() {
        let entity = Entity::new("Cone", "Cone", "Part::Cone")
            .with_property("Radius2", 2.0)
            .with_property("Radius1", 5.0)
            .with_property("Height", 10.0)
            .with_property("Angle1", 45.0);
        assert_eq!(
            format_entity_change(&EntityChange::created(&entity)),
            "Created Cone (Cone: 10.0mm x 5.0mm x 2.0mm)"
        );
    }

    #[test]
    fn test_unknown_dimensions_keep_their_names() {
        let entity = Entity::new("Plate", "Plate", "Part::Feature");
        let mut change = EntityChange::created(&entity);
        change.extracted_dimensions = [
            ("Thickness", 5.0),
            ("Chamfer", 0.5),
            ("Offset", 1.0),
            ("Taper", 2.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        assert_eq!(
            format_entity_change(&change),
            "Created Plate (Shape: Chamfer: 0.5mm, Offset: 1.0mm, Taper: 2.0mm)"
        );

        change.extracted_dimensions.insert("Height".to_string(), 3.0);
        assert_eq!(format_entity_change(&change), "Created Plate (Shape: 3.0mm)");
    }

    #[test]
    fn test_angle_dimension_unit() {
        let entity = Entity::new("Rev", "Rev", "Part::Revolution").with_property("Angle1", 90.0);
        assert_eq!(
            format_entity_change(&EntityChange::created(&entity)),
            "Created Rev (Revolution: 90.0deg)"
        );
    }

    #[test]
    fn test_modified_without_changes_and_empty_label() {
        let entity = Entity::new("Box001", "", "Part::Box");
        assert_eq!(
            format_entity_change(&EntityChange::modified(&entity, vec![])),
            "Modified Box001"
        );
        assert_eq!(
            format_entity_change(&EntityChange::deleted(&entity)),
            "Deleted Box001 (Box)"
        );
    }

    #[test]
    fn test_modified_shows_first_three_changes() {
        let entity = Entity::new("Box", "Box", "Part::Box");
        let changes = ["A", "B", "C", "D"]
            .iter()
            .map(|n| {
                PropertyChange::new(
                    *n,
                    Some(PropertyValue::Bool(false)),
                    Some(PropertyValue::Bool(true)),
                    "",
                )
            })
            .collect();
        let line = format_entity_change(&EntityChange::modified(&entity, changes));
        assert_eq!(
            line,
            "Modified Box: A: false -> true, B: false -> true, C: false -> true"
        );
    }

    #[test]
    fn test_empty_change_set_sentinel() {
        assert_eq!(format_change_set(&ChangeSet::empty("")), NO_CHANGES);
    }
}
