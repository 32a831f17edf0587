//! Snapshot model: JSON layout, derived placement matrix, dependency graph,
//! content digest.

mod common;

use approx::assert_relative_eq;
use common::{part_box, rectangle_sketch, snapshot};
use modeldelta_core::snapshot::{Entity, Placement};
use modeldelta_core::value::{PropertyValue, Rotation, Vector3};
use serde_json::json;

// S1: Entity serializes to the persisted object layout
#[test]
fn test_entity_json_layout() {
    let entity = part_box("Box", "Box1", 10.0, 20.0, 30.0).with_expression("Height", "Sheet.h");
    let json = serde_json::to_value(&entity).unwrap();

    assert_eq!(json["name"], "Box");
    assert_eq!(json["label"], "Box1");
    assert_eq!(json["type"], "Part::Box");
    assert_eq!(json["properties"]["Length"]["value"], 10.0);
    assert_eq!(json["properties"]["Length"]["type"], "App::PropertyLength");
    assert_eq!(json["shape"]["volume_mm3"], 6000.0);
    assert_eq!(json["shape"]["bounding_box"]["size"], json!([10.0, 20.0, 30.0]));
    assert_eq!(json["shape"]["topology"]["faces"], 6);
    assert_eq!(json["expressions"][0]["expression"], "Sheet.h");
    assert_eq!(json["dependencies"]["depends_on"], json!([]));
    assert!(json.get("sketch_data").is_none());
}

// S2: Entity JSON loads back to the same entity
#[test]
fn test_entity_json_reload() {
    let entity = rectangle_sketch("Sketch", 20.0, 10.0);
    let text = serde_json::to_string(&entity).unwrap();
    let back: Entity = serde_json::from_str(&text).unwrap();
    assert_eq!(back, entity);
    let sketch = back.sketch.unwrap();
    assert_eq!(sketch.geometry_count, 4);
    assert_eq!(sketch.constraints[3].operands(), vec![3, 0]);
}

// S3: Placement matrix is derived from position + rotation
#[test]
fn test_placement_matrix_rotation_about_z() {
    let placement = Placement::new(
        Vector3::new(1.0, 2.0, 3.0),
        Rotation::from_degrees(Vector3::new(0.0, 0.0, 1.0), 90.0),
    );
    let m = placement.matrix();
    let expected = [
        [0.0, -1.0, 0.0, 1.0],
        [1.0, 0.0, 0.0, 2.0],
        [0.0, 0.0, 1.0, 3.0],
        [0.0, 0.0, 0.0, 1.0],
    ];
    for r in 0..4 {
        for c in 0..4 {
            assert_relative_eq!(m[r][c], expected[r][c], epsilon = 1e-12);
        }
    }
}

// S4: Placement JSON carries position, axis-angle rotation and matrix
#[test]
fn test_placement_json() {
    let placement = Placement::new(
        Vector3::new(5.0, 0.0, 0.0),
        Rotation::new(Vector3::new(0.0, 0.0, 1.0), 0.0),
    );
    let json = serde_json::to_value(placement).unwrap();
    assert_eq!(json["position"], json!({"x": 5.0, "y": 0.0, "z": 0.0}));
    assert_eq!(json["rotation"], json!({"axis": [0.0, 0.0, 1.0], "angle": 0.0}));
    assert_eq!(json["matrix"][0][3], 5.0);
}

// S5: Host property records with unsupported values are dropped on load
#[test]
fn test_unsupported_properties_dropped() {
    let entity: Entity = serde_json::from_value(json!({
        "name": "Pad",
        "label": "Pad",
        "type": "PartDesign::Pad",
        "properties": {
            "Length": {"value": 5.0, "unit": "mm", "type": "App::PropertyLength"},
            "Profile": {"value": null, "type": "App::PropertyLinkSub"},
            "Reversed": {"value": false, "type": "App::PropertyBool"},
            "Direction": {"value": {"x": 0.0, "y": 0.0, "z": 1.0}, "type": "App::PropertyVector"}
        },
        "dependencies": {"depends_on": ["Sketch"], "used_by": []}
    }))
    .unwrap();

    let names: Vec<&str> = entity.properties.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Direction", "Length", "Reversed"]);
    assert_eq!(
        entity.property_value("Direction"),
        Some(&PropertyValue::Vector3(Vector3::new(0.0, 0.0, 1.0)))
    );
    assert_eq!(entity.property("Length").unwrap().display_unit(), Some("mm"));
}

// S6: Dependency graph roots and tree
#[test]
fn test_dependency_graph() {
    let s = snapshot(vec![
        rectangle_sketch("Sketch", 20.0, 10.0)
            .with_dependencies(vec![], vec!["Pad".to_string()]),
        Entity::new("Pad", "Pad", "PartDesign::Pad")
            .with_dependencies(vec!["Sketch".to_string()], vec![]),
    ]);
    let graph = s.dependency_graph();
    assert_eq!(graph.roots, vec!["Pad".to_string()]);
    assert_eq!(graph.tree.len(), 1);
    assert_eq!(graph.dependencies_of("Pad"), ["Sketch".to_string()]);
}

// S7: Content digest ignores capture time but tracks content
#[test]
fn test_content_digest() {
    let a = snapshot(vec![part_box("Box", "Box", 1.0, 1.0, 1.0)]);
    let b = modeldelta_core::Snapshot::new(
        a.document().clone(),
        vec![part_box("Box", "Box", 1.0, 1.0, 1.0)],
    );
    let c = snapshot(vec![part_box("Box", "Box", 2.0, 1.0, 1.0)]);
    assert_eq!(a.content_digest().unwrap(), b.content_digest().unwrap());
    assert_ne!(a.content_digest().unwrap(), c.content_digest().unwrap());
}

// S8: Validation catches duplicate ids
#[test]
fn test_validate() {
    assert!(snapshot(vec![part_box("A", "A", 1.0, 1.0, 1.0)]).validate().is_ok());
    let dup = snapshot(vec![
        part_box("A", "A", 1.0, 1.0, 1.0),
        part_box("A", "B", 1.0, 1.0, 1.0),
    ]);
    assert!(dup.validate().is_err());
}
