use chrono::{DateTime, TimeZone, Utc};
use modeldelta_core::snapshot::{DocumentInfo, Entity, Placement, Snapshot};
use modeldelta_core::value::Property;

/// 2024-05-01 10:00:00 UTC plus `minutes`
#[allow(dead_code)]
pub fn at_minute(minutes: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, minutes, 0).unwrap()
}

/// Snapshot of the "Bracket" document captured at `at_minute(minutes)`
#[allow(dead_code)]
pub fn bracket(minutes: u32, entities: Vec<Entity>) -> Snapshot {
    Snapshot::captured_at(at_minute(minutes), DocumentInfo::named("Bracket"), entities)
}

/// `Part::Box` with a Length property in mm
#[allow(dead_code)]
pub fn part_box(id: &str, length: f64) -> Entity {
    Entity::new(id, id, "Part::Box")
        .with_property("Length", Property::new(length).with_unit("mm"))
        .with_placement(Placement::default())
}
