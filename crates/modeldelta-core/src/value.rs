//! Property value model and tolerance-based equality.
//!
//! Every property captured from the host is converted into the closed
//! [`PropertyValue`] union at the capture boundary. Values that fit none of
//! the variants are dropped there and never reach the diff engine.

use nalgebra::{Unit, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Absolute tolerance for numeric comparison, in millimeters / degrees.
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// Axis norms below this are treated as "no axis" (identity rotation).
const AXIS_EPSILON: f64 = 1e-12;

/// A 3D vector or point in document units (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Per-axis comparison; every axis must be within `tolerance`.
    pub fn approx_eq(&self, other: &Vector3, tolerance: f64) -> bool {
        numbers_equal(self.x, other.x, tolerance)
            && numbers_equal(self.y, other.y, tolerance)
            && numbers_equal(self.z, other.z, tolerance)
    }

    /// Component-wise `other - self`.
    pub fn delta_to(&self, other: &Vector3) -> Vector3 {
        Vector3::new(other.x - self.x, other.y - self.y, other.z - self.z)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vector3> for nalgebra::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

impl From<nalgebra::Vector3<f64>> for Vector3 {
    fn from(v: nalgebra::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl std::fmt::Display for Vector3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Axis-angle rotation. `angle` is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    #[serde(with = "vector_array")]
    pub axis: Vector3,
    pub angle: f64,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Rotation {
    pub const fn new(axis: Vector3, angle: f64) -> Self {
        Self { axis, angle }
    }

    /// Zero rotation about +Z.
    pub const fn identity() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 1.0), 0.0)
    }

    /// Rotation of `degrees` about `axis`.
    pub fn from_degrees(axis: Vector3, degrees: f64) -> Self {
        Self::new(axis, degrees.to_radians())
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Unit quaternion for this rotation. A degenerate axis yields identity.
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        match Unit::try_new(nalgebra::Vector3::from(self.axis), AXIS_EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, self.angle),
            None => UnitQuaternion::identity(),
        }
    }

    /// Angular distance to `other` in radians, in `[0, π]`.
    ///
    /// Independent of representation: `(a, θ)` and `(-a, -θ)` are distance 0.
    pub fn angle_to(&self, other: &Rotation) -> f64 {
        self.to_quaternion().angle_to(&other.to_quaternion())
    }

    /// True if the two rotations differ by less than `tolerance` degrees.
    pub fn approx_eq(&self, other: &Rotation, tolerance: f64) -> bool {
        self == other || self.angle_to(other).to_degrees() < tolerance
    }

    pub fn is_finite(&self) -> bool {
        self.axis.is_finite() && self.angle.is_finite()
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}° about {}", self.angle_degrees(), self.axis)
    }
}

/// Closed set of property value types.
///
/// Serialized untagged, so the persisted JSON stays the plain host value:
/// `12.5`, `"text"`, `true`, `{"x":..,"y":..,"z":..}` or
/// `{"axis":[..],"angle":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Vector3(Vector3),
    Rotation(Rotation),
}

impl PropertyValue {
    /// Short tag naming the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            PropertyValue::Number(_) => "number",
            PropertyValue::Text(_) => "text",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Vector3(_) => "vector3",
            PropertyValue::Rotation(_) => "rotation",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vector3> {
        match self {
            PropertyValue::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// False if any float component is NaN or infinite. Text and bool are
    /// always finite.
    pub fn is_finite(&self) -> bool {
        match self {
            PropertyValue::Number(n) => n.is_finite(),
            PropertyValue::Text(_) | PropertyValue::Bool(_) => true,
            PropertyValue::Vector3(v) => v.is_finite(),
            PropertyValue::Rotation(r) => r.is_finite(),
        }
    }

    /// Convert a raw host JSON value. Returns `None` for unsupported shapes
    /// (null, arrays, arbitrary objects).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null | serde_json::Value::Array(_) => None,
            other => serde_json::from_value(other.clone()).ok(),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{:.2}", n),
            PropertyValue::Text(s) => write!(f, "{}", s),
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Vector3(v) => write!(f, "{}", v),
            PropertyValue::Rotation(r) => write!(f, "{}", r),
        }
    }
}

impl From<f64> for PropertyValue {
    fn from(n: f64) -> Self {
        PropertyValue::Number(n)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Vector3> for PropertyValue {
    fn from(v: Vector3) -> Self {
        PropertyValue::Vector3(v)
    }
}

impl From<Rotation> for PropertyValue {
    fn from(r: Rotation) -> Self {
        PropertyValue::Rotation(r)
    }
}

/// A captured property: value plus display-only metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub value: PropertyValue,
    /// Display unit as reported by the host; never used for comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Host property type id, e.g. `App::PropertyLength`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub host_type: Option<String>,
}

impl Property {
    pub fn new(value: impl Into<PropertyValue>) -> Self {
        Self {
            value: value.into(),
            unit: None,
            host_type: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_host_type(mut self, host_type: impl Into<String>) -> Self {
        self.host_type = Some(host_type.into());
        self
    }

    /// Unit to show next to this value.
    ///
    /// An explicit unit wins; otherwise it is inferred from the host type
    /// (`Length`/`Distance` → mm, `Angle` → deg).
    pub fn display_unit(&self) -> Option<&str> {
        if let Some(unit) = self.unit.as_deref().filter(|u| !u.is_empty()) {
            return Some(unit);
        }
        let host_type = self.host_type.as_deref()?;
        if host_type.contains("Length") || host_type.contains("Distance") {
            Some("mm")
        } else if host_type.contains("Angle") {
            Some("deg")
        } else {
            None
        }
    }
}

impl From<PropertyValue> for Property {
    fn from(value: PropertyValue) -> Self {
        Self::new(value)
    }
}

impl From<f64> for Property {
    fn from(n: f64) -> Self {
        Self::new(n)
    }
}

impl From<bool> for Property {
    fn from(b: bool) -> Self {
        Self::new(b)
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<Vector3> for Property {
    fn from(v: Vector3) -> Self {
        Self::new(v)
    }
}

impl From<Rotation> for Property {
    fn from(r: Rotation) -> Self {
        Self::new(r)
    }
}

fn numbers_equal(a: f64, b: f64, tolerance: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan()) || (a - b).abs() < tolerance
}

/// Compare two optional values with [`DEFAULT_TOLERANCE`].
///
/// - absent on both sides → equal
/// - absent on one side → unequal
/// - numbers within tolerance, vectors per axis, rotations by angular distance
/// - text / bool exactly
/// - mismatched variants → unequal
pub fn values_equal(a: Option<&PropertyValue>, b: Option<&PropertyValue>) -> bool {
    values_equal_within(a, b, DEFAULT_TOLERANCE)
}

/// [`values_equal`] with an explicit tolerance.
pub fn values_equal_within(
    a: Option<&PropertyValue>,
    b: Option<&PropertyValue>,
    tolerance: f64,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (None, Some(_)) | (Some(_), None) => false,
        (Some(a), Some(b)) => match (a, b) {
            (PropertyValue::Number(x), PropertyValue::Number(y)) => {
                numbers_equal(*x, *y, tolerance)
            }
            (PropertyValue::Text(x), PropertyValue::Text(y)) => x == y,
            (PropertyValue::Bool(x), PropertyValue::Bool(y)) => x == y,
            (PropertyValue::Vector3(x), PropertyValue::Vector3(y)) => x.approx_eq(y, tolerance),
            (PropertyValue::Rotation(x), PropertyValue::Rotation(y)) => x.approx_eq(y, tolerance),
            _ => false,
        },
    }
}

/// Serialize a [`Vector3`] as a `[x, y, z]` array.
pub(crate) mod vector_array {
    use super::Vector3;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(v: &Vector3, serializer: S) -> Result<S::Ok, S::Error> {
        v.to_array().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vector3, D::Error> {
        <[f64; 3]>::deserialize(deserializer).map(Vector3::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_absent_on_both_sides_is_equal() {
        assert!(values_equal(None, None));
    }

    #[test]
    fn test_appearing_property_is_unequal() {
        let v = PropertyValue::Number(1.0);
        assert!(!values_equal(None, Some(&v)));
        assert!(!values_equal(Some(&v), None));
    }

    #[test]
    fn test_mismatched_variants_are_unequal() {
        let a = PropertyValue::Number(1.0);
        let b = PropertyValue::Text("1".to_string());
        assert!(!values_equal(Some(&a), Some(&b)));
    }

    #[test]
    fn test_nan_compares_equal_to_itself() {
        let a = PropertyValue::Number(f64::NAN);
        assert!(values_equal(Some(&a), Some(&a)));
    }

    #[test]
    fn test_rotation_sign_flip_is_same_rotation() {
        let a = Rotation::new(Vector3::new(0.0, 0.0, 1.0), FRAC_PI_2);
        let b = Rotation::new(Vector3::new(0.0, 0.0, -1.0), -FRAC_PI_2);
        assert!(a.approx_eq(&b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_zero_angle_ignores_axis() {
        let a = Rotation::new(Vector3::new(1.0, 0.0, 0.0), 0.0);
        let b = Rotation::identity();
        assert!(a.approx_eq(&b, DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_degenerate_axis_is_identity() {
        let r = Rotation::new(Vector3::zero(), 1.0);
        assert!(r.approx_eq(&Rotation::identity(), DEFAULT_TOLERANCE));
    }

    #[test]
    fn test_from_json_variants() {
        assert_eq!(
            PropertyValue::from_json(&json!(10)),
            Some(PropertyValue::Number(10.0))
        );
        assert_eq!(
            PropertyValue::from_json(&json!(true)),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(
            PropertyValue::from_json(&json!({"x": 1.0, "y": 2.0, "z": 3.0})),
            Some(PropertyValue::Vector3(Vector3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            PropertyValue::from_json(&json!({"axis": [0.0, 0.0, 1.0], "angle": 0.5})),
            Some(PropertyValue::Rotation(Rotation::new(
                Vector3::new(0.0, 0.0, 1.0),
                0.5
            )))
        );
        assert_eq!(PropertyValue::from_json(&json!(null)), None);
        assert_eq!(PropertyValue::from_json(&json!([1, 2])), None);
        assert_eq!(PropertyValue::from_json(&json!({"shape": "brep"})), None);
    }

    #[test]
    fn test_display_unit_inference() {
        let explicit = Property::new(1.0).with_unit("in");
        assert_eq!(explicit.display_unit(), Some("in"));

        let length = Property::new(1.0).with_host_type("App::PropertyLength");
        assert_eq!(length.display_unit(), Some("mm"));

        let angle = Property::new(1.0).with_host_type("App::PropertyAngle");
        assert_eq!(angle.display_unit(), Some("deg"));

        let plain = Property::new(1.0).with_host_type("App::PropertyInteger");
        assert_eq!(plain.display_unit(), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(PropertyValue::Number(12.3456).to_string(), "12.35");
        assert_eq!(
            PropertyValue::Vector3(Vector3::new(1.0, 2.24, -3.0)).to_string(),
            "(1.0, 2.2, -3.0)"
        );
        assert_eq!(
            PropertyValue::Rotation(Rotation::from_degrees(Vector3::new(0.0, 0.0, 1.0), 90.0))
                .to_string(),
            "90.0° about (0.0, 0.0, 1.0)"
        );
    }
}
