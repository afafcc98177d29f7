//! Entity records held by the registry.
//!
//! These are passive data: they carry identity and a few light invariants
//! (validated coordinates, canonical dates) but every cross-entity rule is
//! enforced by [`Registry`](crate::Registry), the only owner allowed to
//! mutate them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::compute::validation;
use crate::error::{RegistryError, Result};

/// Side length of the square grid; valid components lie in `[0, MAP_SIZE)`.
pub const MAP_SIZE: i64 = 1000;

/// Tolerance for floating-point distance comparisons.
pub const EPSILON: f64 = 1e-9;

/// Integer grid position of a POI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    x: i64,
    y: i64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    pub fn new(x: i64, y: i64) -> Result<Self> {
        validation::validate_coordinate(x, y)
    }

    /// Builds a coordinate without range checks. Callers must have validated.
    pub(crate) const fn new_unchecked(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn x(&self) -> i64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i64 {
        self.y
    }

    /// Euclidean distance, computed with `hypot` so axis-aligned triangles are exact.
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        ((self.x - other.x) as f64).hypot((self.y - other.y) as f64)
    }
}

impl TryFrom<(f64, f64)> for Coordinate {
    type Error = RegistryError;

    /// Accepts whole-valued floats only, e.g. `(3.0, 4.0)` but not `(3.5, 4.0)`.
    fn try_from((x, y): (f64, f64)) -> Result<Self> {
        let whole = |v: f64| v.is_finite() && v.fract() == 0.0;
        if !whole(x) || !whole(y) {
            return Err(RegistryError::InvalidCoordinate { x, y });
        }
        validation::validate_coordinate(x as i64, y as i64)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Calendar date of a visit.
///
/// Ordering is chronological. The canonical text form is the zero-padded
/// `dd/mm/yyyy` produced by `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisitDate(NaiveDate);

impl VisitDate {
    pub(crate) fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl fmt::Display for VisitDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.day(), self.month(), self.year())
    }
}

impl std::str::FromStr for VisitDate {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        validation::validate_date(s)
    }
}

impl Serialize for VisitDate {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VisitDate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Value stored under one attribute of a POI.
///
/// Whole numbers that fit in an `i64` are kept as [`AttrValue::Integer`];
/// every other number is an [`AttrValue::Number`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Explicit "no value"; distinct from the key being missing.
    #[default]
    Absent,
    Bool(bool),
    // Must precede `Number` so untagged decoding tries it first.
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AttrValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, AttrValue::Absent)
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Number(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(AttrValue::Absent, Into::into)
    }
}

/// Attribute name to value, as stored on a POI.
pub type AttrValues = BTreeMap<String, AttrValue>;

/// Stable handle of a POI type inside the registry arena.
///
/// POIs refer to their type through this key, so renaming a type is seen by
/// every referencing POI without touching them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeKey(pub(crate) u64);

/// Named category with an ordered attribute schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiType {
    pub(crate) name: String,
    pub(crate) attributes: Vec<String>,
}

impl PoiType {
    /// Normalized (trimmed, lowercase) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}

/// A located point of interest.
#[derive(Debug, Clone, PartialEq)]
pub struct Poi {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) type_key: TypeKey,
    pub(crate) coordinate: Coordinate,
    pub(crate) values: AttrValues,
}

impl Poi {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// Raw stored values. May drift from the type's current schema; use
    /// [`Registry::list_pois_of_type_with_values`](crate::Registry::list_pois_of_type_with_values)
    /// for a schema-aligned view.
    pub fn values(&self) -> &AttrValues {
        &self.values
    }

    pub fn distance_to(&self, other: &Poi) -> f64 {
        self.coordinate.distance_to(&other.coordinate)
    }
}

impl fmt::Display for Poi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "POI(id={}, name={}, center={})", self.id, self.name, self.coordinate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visitor {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) nationality: String,
}

impl Visitor {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nationality(&self) -> &str {
        &self.nationality
    }
}

impl fmt::Display for Visitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Visitor(id={}, name={}, nationality={})",
            self.id, self.name, self.nationality
        )
    }
}

/// Immutable record of one visitor visiting one POI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Visit {
    pub(crate) visitor_id: i64,
    pub(crate) poi_id: i64,
    pub(crate) date: VisitDate,
    pub(crate) rating: Option<u8>,
}

impl Visit {
    pub fn visitor_id(&self) -> i64 {
        self.visitor_id
    }

    pub fn poi_id(&self) -> i64 {
        self.poi_id
    }

    pub fn date(&self) -> VisitDate {
        self.date
    }

    pub fn rating(&self) -> Option<u8> {
        self.rating
    }
}
