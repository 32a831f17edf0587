//! Reconstruction script rendering.
//!
//! Turns a snapshot into a Python script that recreates its primitives in
//! the host. Parametric primitives are rebuilt from their dimension
//! properties; everything else is listed as a comment for manual work.

use crate::snapshot::model::{Entity, Placement, Snapshot};
use crate::value::PropertyValue;

/// Suffix appended to a snapshot file stem for its script, e.g.
/// `001_2024-05-01_10-00-00_reconstruct.py`.
pub const SCRIPT_SUFFIX: &str = "_reconstruct.py";

/// Primitive type tag and its `(property, default)` parameters.
const PRIMITIVES: &[(&str, &[(&str, f64)])] = &[
    (
        "Part::Box",
        &[("Length", 10.0), ("Width", 10.0), ("Height", 10.0)],
    ),
    ("Part::Cylinder", &[("Radius", 5.0), ("Height", 10.0)]),
    ("Part::Sphere", &[("Radius", 5.0)]),
    (
        "Part::Cone",
        &[("Radius1", 5.0), ("Radius2", 0.0), ("Height", 10.0)],
    ),
];

/// Render the reconstruction script for `snapshot`. Entities are emitted in
/// snapshot order.
///
/// ```
/// use modeldelta_core::snapshot::{reconstruction_script, DocumentInfo, Entity, Snapshot};
///
/// let snapshot = Snapshot::new(
///     DocumentInfo::named("Doc"),
///     vec![Entity::new("Box", "Box", "Part::Box").with_property("Length", 20.0)],
/// );
/// let script = reconstruction_script(&snapshot);
/// assert!(script.contains("Box = doc.addObject('Part::Box', 'Box')"));
/// assert!(script.contains("Box.Length = 20.0"));
/// ```
pub fn reconstruction_script(snapshot: &Snapshot) -> String {
    let mut output = String::new();

    output.push_str("# Auto-generated reconstruction script\n");
    output.push_str(&format!(
        "# Generated: {}\n",
        snapshot.timestamp().format("%Y-%m-%dT%H:%M:%S")
    ));
    output.push_str(&format!("# Document: {}\n", snapshot.document_name()));
    output.push_str("#\n");
    output.push_str("# Run this script in FreeCAD to recreate the objects.\n\n");
    output.push_str("import FreeCAD\n");
    output.push_str("import Part\n\n");
    output.push_str("# Get or create document\n");
    output.push_str(&format!(
        "doc_name = {}\n",
        py_str(snapshot.document_name())
    ));
    output.push_str("if FreeCAD.ActiveDocument is None:\n");
    output.push_str("    doc = FreeCAD.newDocument(doc_name)\n");
    output.push_str("else:\n");
    output.push_str("    doc = FreeCAD.ActiveDocument\n\n");

    for entity in snapshot.entities() {
        render_entity(&mut output, entity);
    }

    output.push_str("# Recompute document\n");
    output.push_str("doc.recompute()\n\n");
    output.push_str("print(f'Reconstructed {len(doc.Objects)} objects in {doc.Name}')\n");
    output
}

fn render_entity(output: &mut String, entity: &Entity) {
    let label = entity.display_label();
    let var = py_identifier(entity.id.as_str());
    output.push_str(&format!("# --- {} ({}) ---\n", label, entity.type_tag));

    let primitive = PRIMITIVES
        .iter()
        .find(|(tag, _)| *tag == entity.type_tag);

    if let Some((tag, params)) = primitive {
        output.push_str(&format!(
            "{} = doc.addObject({}, {})\n",
            var,
            py_str(tag),
            py_str(entity.id.as_str())
        ));
        output.push_str(&format!("{}.Label = {}\n", var, py_str(label)));
        for (name, default) in params.iter() {
            let value = match entity.property_value(name) {
                Some(PropertyValue::Number(n)) => *n,
                _ => *default,
            };
            output.push_str(&format!("{}.{} = {}\n", var, name, py_float(value)));
        }
        if let Some(placement) = &entity.placement {
            render_placement(output, &var, placement);
        }
    } else if entity.type_tag == "Part::Feature" {
        let vertex_count = entity
            .shape
            .as_ref()
            .and_then(|s| s.vertices.as_ref())
            .map_or(0, Vec::len);
        if vertex_count > 0 {
            output.push_str(&format!("# {} has {} vertices\n", label, vertex_count));
            output.push_str("# Vertices stored but complex shape reconstruction not implemented\n");
        } else {
            output.push_str(&format!(
                "# {}: Complex Part::Feature - manual reconstruction needed\n",
                label
            ));
        }
    } else if entity.type_tag.contains("Sketcher") {
        let (geometry, constraints) = entity
            .sketch
            .as_ref()
            .map_or((0, 0), |s| (s.geometry_count, s.constraint_count));
        output.push_str(&format!(
            "# Sketch {}: {} geometries, {} constraints\n",
            label, geometry, constraints
        ));
        output.push_str("# Sketch reconstruction requires Sketcher module integration\n");
    } else {
        output.push_str(&format!(
            "# {}: {} - type-specific reconstruction not implemented\n",
            label, entity.type_tag
        ));
    }

    output.push('\n');
}

fn render_placement(output: &mut String, var: &str, placement: &Placement) {
    let p = placement.position;
    let r = placement.rotation;
    output.push_str(&format!("if hasattr({}, 'Placement'):\n", var));
    output.push_str(&format!(
        "    {}.Placement.Base = FreeCAD.Vector({}, {}, {})\n",
        var,
        py_float(p.x),
        py_float(p.y),
        py_float(p.z)
    ));
    // FreeCAD.Rotation(axis, angle) takes degrees
    output.push_str(&format!(
        "    {}.Placement.Rotation = FreeCAD.Rotation(FreeCAD.Vector({}, {}, {}), {})\n",
        var,
        py_float(r.axis.x),
        py_float(r.axis.y),
        py_float(r.axis.z),
        py_float(r.angle_degrees())
    ));
}

/// Python float literal. `{:?}` keeps the trailing `.0` on whole numbers.
fn py_float(value: f64) -> String {
    if value.is_nan() {
        "float('nan')".to_string()
    } else if value.is_infinite() {
        if value > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else {
        format!("{:?}", value)
    }
}

/// Single-quoted Python string literal.
fn py_str(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

/// Variable name for an entity id: non-identifier characters become `_`,
/// and a leading digit gets a `_` prefix.
fn py_identifier(id: &str) -> String {
    let mut name: String = id
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}
