//! Headline dimension extraction for created entities.

use crate::snapshot::ShapeSummary;
use crate::value::{Property, PropertyValue};
use std::collections::BTreeMap;

/// Well-known dimension property names, in display priority order.
pub const DIMENSION_NAMES: &[&str] = &[
    "Length", "Width", "Height", "Radius", "Radius1", "Radius2", "Diameter", "Depth", "Size",
    "Angle1", "Angle2",
];

/// Pick numeric dimension properties from the bag. When none are present,
/// fall back to the bounding-box extents as `Length` / `Width` / `Height`.
pub fn extract_dimensions(
    properties: &BTreeMap<String, Property>,
    shape: Option<&ShapeSummary>,
) -> BTreeMap<String, f64> {
    let mut dims: BTreeMap<String, f64> = DIMENSION_NAMES
        .iter()
        .filter_map(|name| match properties.get(*name).map(|p| &p.value) {
            Some(PropertyValue::Number(n)) => Some((name.to_string(), *n)),
            _ => None,
        })
        .collect();

    if dims.is_empty() {
        if let Some(bbox) = shape.and_then(|s| s.bounding_box) {
            let size = bbox.size();
            dims.insert("Length".to_string(), size.x);
            dims.insert("Width".to_string(), size.y);
            dims.insert("Height".to_string(), size.z);
        }
    }
    dims
}

/// Display unit for a dimension name.
pub fn dimension_unit(name: &str) -> &'static str {
    if name.starts_with("Angle") {
        "deg"
    } else {
        "mm"
    }
}
