//! Snapshot data model.
//!
//! Serde layout of [`Entity`] matches one element of the persisted
//! `objects` array (`name`, `label`, `type`, `placement`, `properties`,
//! `shape`, `sketch_data`, `expressions`, `dependencies`).

use crate::errors::SnapshotError;
use crate::snapshot::graph::DependencyGraph;
use crate::value::{vector_array, Property, PropertyValue, Rotation, Vector3};
use chrono::{DateTime, Utc};
use modeldelta_core_types::EntityId;
use nalgebra::{Isometry3, Translation3};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Shapes with more vertices than this carry no literal vertex list.
pub const MAX_CAPTURED_VERTICES: usize = 1000;

/// Position and orientation of an entity.
///
/// The 4×4 matrix is derived on demand and never stored, so it cannot drift
/// from position + rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "PlacementRepr", into = "PlacementRepr")]
pub struct Placement {
    pub position: Vector3,
    pub rotation: Rotation,
}

impl Placement {
    pub fn new(position: Vector3, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    /// Pure translation.
    pub fn at(position: Vector3) -> Self {
        Self::new(position, Rotation::identity())
    }

    /// Row-major homogeneous transform: rotation, then translation.
    pub fn matrix(&self) -> [[f64; 4]; 4] {
        let p = self.position;
        let iso = Isometry3::from_parts(
            Translation3::new(p.x, p.y, p.z),
            self.rotation.to_quaternion(),
        );
        let m = iso.to_homogeneous();
        let mut rows = [[0.0; 4]; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = m[(r, c)];
            }
        }
        rows
    }
}

#[derive(Serialize, Deserialize)]
struct PlacementRepr {
    position: Vector3,
    rotation: Rotation,
    // Written for external readers, recomputed rather than trusted on load.
    #[serde(default, skip_deserializing)]
    matrix: [[f64; 4]; 4],
}

impl From<PlacementRepr> for Placement {
    fn from(repr: PlacementRepr) -> Self {
        Placement::new(repr.position, repr.rotation)
    }
}

impl From<Placement> for PlacementRepr {
    fn from(p: Placement) -> Self {
        PlacementRepr {
            position: p.position,
            rotation: p.rotation,
            matrix: p.matrix(),
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "BoundingBoxRepr", into = "BoundingBoxRepr")]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// X/Y/Z extents.
    pub fn size(&self) -> Vector3 {
        self.min.delta_to(&self.max)
    }
}

#[derive(Serialize, Deserialize)]
struct BoundingBoxRepr {
    #[serde(with = "vector_array")]
    min: Vector3,
    #[serde(with = "vector_array")]
    max: Vector3,
    #[serde(default, skip_deserializing)]
    size: [f64; 3],
}

impl From<BoundingBoxRepr> for BoundingBox {
    fn from(repr: BoundingBoxRepr) -> Self {
        BoundingBox::new(repr.min, repr.max)
    }
}

impl From<BoundingBox> for BoundingBoxRepr {
    fn from(b: BoundingBox) -> Self {
        BoundingBoxRepr {
            min: b.min,
            max: b.max,
            size: b.size().to_array(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyCounts {
    pub solids: usize,
    pub shells: usize,
    pub faces: usize,
    pub edges: usize,
    pub vertices: usize,
}

/// Aggregate geometry statistics, short of full geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSummary {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(rename = "volume_mm3", default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(
        rename = "surface_area_mm2",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center_of_mass: Option<Vector3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<TopologyCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Vector3>>,
}

impl ShapeSummary {
    /// A valid shape with the given bounds and no other metrics yet.
    pub fn new(bounding_box: BoundingBox) -> Self {
        Self {
            valid: true,
            shape_type: None,
            bounding_box: Some(bounding_box),
            volume: None,
            surface_area: None,
            center_of_mass: None,
            topology: None,
            vertices: None,
        }
    }

    /// The host reported a shape that failed validity checks.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            shape_type: None,
            bounding_box: None,
            volume: None,
            surface_area: None,
            center_of_mass: None,
            topology: None,
            vertices: None,
        }
    }

    pub fn with_shape_type(mut self, shape_type: impl Into<String>) -> Self {
        self.shape_type = Some(shape_type.into());
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_surface_area(mut self, area: f64) -> Self {
        self.surface_area = Some(area);
        self
    }

    pub fn with_center_of_mass(mut self, center: Vector3) -> Self {
        self.center_of_mass = Some(center);
        self
    }

    pub fn with_topology(mut self, topology: TopologyCounts) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Attach literal vertex coordinates, unless there are more than
    /// [`MAX_CAPTURED_VERTICES`].
    pub fn with_vertices(mut self, vertices: Vec<Vector3>) -> Self {
        self.vertices = (vertices.len() <= MAX_CAPTURED_VERTICES).then_some(vertices);
        self
    }
}

/// One geometry element of a parametric sketch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchGeometry {
    pub index: usize,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

/// One sketch constraint. Operands are geometry indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConstraint {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    pub first: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl SketchConstraint {
    pub fn operands(&self) -> Vec<i64> {
        std::iter::once(self.first).chain(self.second).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SketchSummary {
    pub geometry_count: usize,
    pub constraint_count: usize,
    pub fully_constrained: bool,
    #[serde(default)]
    pub geometry: Vec<SketchGeometry>,
    #[serde(default)]
    pub constraints: Vec<SketchConstraint>,
}

impl SketchSummary {
    /// Build a summary whose counts match the element lists.
    pub fn new(
        geometry: Vec<SketchGeometry>,
        constraints: Vec<SketchConstraint>,
        fully_constrained: bool,
    ) -> Self {
        Self {
            geometry_count: geometry.len(),
            constraint_count: constraints.len(),
            fully_constrained,
            geometry,
            constraints,
        }
    }
}

/// Dependency edges, by label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub used_by: Vec<String>,
}

/// An expression bound to a property (e.g. `Length = Spreadsheet.width`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionBinding {
    pub property: String,
    pub expression: String,
}

/// One addressable object in a modeling document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "name")]
    pub id: EntityId,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: BTreeMap<String, Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeSummary>,
    #[serde(rename = "sketch_data", default, skip_serializing_if = "Option::is_none")]
    pub sketch: Option<SketchSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expressions: Vec<ExpressionBinding>,
    #[serde(default)]
    pub dependencies: Dependencies,
}

impl Entity {
    pub fn new(
        id: impl Into<EntityId>,
        label: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            type_tag: type_tag.into(),
            placement: None,
            properties: BTreeMap::new(),
            shape: None,
            sketch: None,
            expressions: Vec::new(),
            dependencies: Dependencies::default(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property: impl Into<Property>) -> Self {
        self.properties.insert(name.into(), property.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    pub fn with_shape(mut self, shape: ShapeSummary) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_sketch(mut self, sketch: SketchSummary) -> Self {
        self.sketch = Some(sketch);
        self
    }

    pub fn with_expression(
        mut self,
        property: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        self.expressions.push(ExpressionBinding {
            property: property.into(),
            expression: expression.into(),
        });
        self
    }

    pub fn with_dependencies(mut self, depends_on: Vec<String>, used_by: Vec<String>) -> Self {
        self.dependencies = Dependencies {
            depends_on,
            used_by,
        };
        self
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// True if a compared value (property or placement) is NaN or infinite.
    pub fn has_non_finite_values(&self) -> bool {
        self.properties.values().any(|p| !p.value.is_finite())
            || self
                .placement
                .is_some_and(|pl| !pl.position.is_finite() || !pl.rotation.is_finite())
    }

    pub fn property_value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name).map(|p| &p.value)
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

/// Accept `{value, unit, type}` records or bare values; drop anything that
/// does not fit [`PropertyValue`].
fn lenient_properties<'de, D>(deserializer: D) -> Result<BTreeMap<String, Property>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            let property = serde_json::from_value::<Property>(value.clone())
                .ok()
                .or_else(|| PropertyValue::from_json(&value).map(Property::new));
            if property.is_none() {
                tracing::debug!(property = %name, "dropping unsupported property value");
            }
            property.map(|p| (name, p))
        })
        .collect())
}

/// Document-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub modified: bool,
}

impl DocumentInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The whole document at one instant.
///
/// Immutable once built: fields are private and there are no mutators after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    captured_at: DateTime<Utc>,
    document: DocumentInfo,
    environment: BTreeMap<String, serde_json::Value>,
    entities: Vec<Entity>,
}

impl Snapshot {
    /// Snapshot captured now.
    pub fn new(document: DocumentInfo, entities: Vec<Entity>) -> Self {
        Self::captured_at(Utc::now(), document, entities)
    }

    pub fn captured_at(
        captured_at: DateTime<Utc>,
        document: DocumentInfo,
        entities: Vec<Entity>,
    ) -> Self {
        Self {
            captured_at,
            document,
            environment: BTreeMap::new(),
            entities,
        }
    }

    /// Attach host diagnostics (version, active workbench, unit schema, ...).
    pub fn with_environment(mut self, environment: BTreeMap<String, serde_json::Value>) -> Self {
        self.environment = environment;
        self
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn document(&self) -> &DocumentInfo {
        &self.document
    }

    pub fn document_name(&self) -> &str {
        &self.document.name
    }

    pub fn environment(&self) -> &BTreeMap<String, serde_json::Value> {
        &self.environment
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|e| &e.id)
    }

    /// Check that every entity id is unique.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::DuplicateIdentity`] for the first repeated id.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::with_capacity(self.entities.len());
        for entity in &self.entities {
            if !seen.insert(&entity.id) {
                return Err(SnapshotError::DuplicateIdentity {
                    id: entity.id.clone(),
                    document: self.document.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Dependency tree over entity labels.
    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::from_entities(&self.entities)
    }

    /// See [`content_digest`](crate::snapshot::digest::content_digest).
    ///
    /// # Errors
    ///
    /// Returns `ERR_SERIALIZATION` if the entities cannot be serialized.
    pub fn content_digest(&self) -> crate::errors::Result<String> {
        crate::snapshot::digest::content_digest(self)
    }

    /// See [`Entity::has_non_finite_values`].
    pub fn has_non_finite_values(&self) -> bool {
        self.entities.iter().any(Entity::has_non_finite_values)
    }
}
