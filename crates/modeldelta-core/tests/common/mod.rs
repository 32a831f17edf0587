use chrono::{TimeZone, Utc};
use modeldelta_core::snapshot::{
    BoundingBox, DocumentInfo, Entity, Placement, ShapeSummary, SketchConstraint, SketchGeometry,
    SketchSummary, Snapshot, TopologyCounts,
};
use modeldelta_core::value::{Property, Vector3};

/// Snapshot of the "Unnamed" document at a fixed instant
#[allow(dead_code)]
pub fn snapshot(entities: Vec<Entity>) -> Snapshot {
    Snapshot::captured_at(
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        DocumentInfo::named("Unnamed"),
        entities,
    )
}

/// `Part::Box` with Length/Width/Height in mm, placed at the origin
#[allow(dead_code)]
pub fn part_box(id: &str, label: &str, length: f64, width: f64, height: f64) -> Entity {
    let mm = |v: f64| Property::new(v).with_host_type("App::PropertyLength");
    Entity::new(id, label, "Part::Box")
        .with_property("Length", mm(length))
        .with_property("Width", mm(width))
        .with_property("Height", mm(height))
        .with_property("Label", label)
        .with_placement(Placement::default())
        .with_shape(
            ShapeSummary::new(BoundingBox::new(
                Vector3::zero(),
                Vector3::new(length, width, height),
            ))
            .with_shape_type("Solid")
            .with_volume(length * width * height)
            .with_topology(TopologyCounts {
                solids: 1,
                shells: 1,
                faces: 6,
                edges: 12,
                vertices: 8,
            }),
        )
}

/// `Part::Cylinder` with Radius/Height
#[allow(dead_code)]
pub fn cylinder(id: &str, radius: f64, height: f64) -> Entity {
    Entity::new(id, id, "Part::Cylinder")
        .with_property("Radius", Property::new(radius).with_unit("mm"))
        .with_property("Height", Property::new(height).with_unit("mm"))
        .with_placement(Placement::default())
}

/// Closed rectangular sketch with four lines and four coincident constraints
#[allow(dead_code)]
pub fn rectangle_sketch(id: &str, width: f64, height: f64) -> Entity {
    let corners = [
        [0.0, 0.0],
        [width, 0.0],
        [width, height],
        [0.0, height],
    ];
    let geometry = (0..4)
        .map(|i| SketchGeometry {
            index: i,
            kind: "LineSegment".to_string(),
            start: Some(corners[i]),
            end: Some(corners[(i + 1) % 4]),
            center: None,
            radius: None,
        })
        .collect();
    let constraints = (0..4i64)
        .map(|i| SketchConstraint {
            kind: "Coincident".to_string(),
            name: None,
            first: i,
            second: Some((i + 1) % 4),
            value: None,
        })
        .collect();
    Entity::new(id, id, "Sketcher::SketchObject")
        .with_sketch(SketchSummary::new(geometry, constraints, false))
        .with_placement(Placement::default())
}
