//! The registry: sole owner of types, POIs, visitors and visits.
//!
//! Types live in an arena keyed by [`TypeKey`]; POIs point at their type by
//! key, so a rename or schema migration mutates one record and every
//! referrer observes it through the lookup. Visits refer to visitors and
//! POIs by id.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::compute::validation;
use crate::error::{Entity, RegistryError, Result};
use crate::model::{AttrValue, AttrValues, Poi, PoiType, TypeKey, Visit, Visitor};

mod queries;
mod schema;

pub use queries::{CoverageRow, PoiVisit, SchemaValues, VisitorVisit};

/// Entity counts, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    pub types: usize,
    pub pois: usize,
    /// Deleted POIs whose ids can never be reused.
    pub retired_poi_ids: usize,
    pub visitors: usize,
    pub visits: usize,
}

/// In-memory catalog of POIs, their types, visitors and visits.
///
/// Single-owner and synchronous: callers needing shared access must wrap it
/// in their own lock.
#[derive(Debug, Default)]
pub struct Registry {
    types: FxHashMap<TypeKey, PoiType>,
    /// Normalized type name -> arena key.
    type_index: BTreeMap<String, TypeKey>,
    next_type_key: u64,
    pois: BTreeMap<i64, Poi>,
    /// Deleted POIs, kept so their ids stay retired and visit history resolves.
    retired_pois: BTreeMap<i64, Poi>,
    visitors: BTreeMap<i64, Visitor>,
    visits: Vec<Visit>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> crate::builder::RegistryBuilder {
        crate::builder::RegistryBuilder::new()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            types: self.types.len(),
            pois: self.pois.len(),
            retired_poi_ids: self.retired_pois.len(),
            visitors: self.visitors.len(),
            visits: self.visits.len(),
        }
    }

    // --- lookups ---

    /// Looks up a type by name (case and surrounding whitespace ignored).
    pub fn poi_type(&self, name: &str) -> Option<&PoiType> {
        self.type_key(name).and_then(|key| self.types.get(&key))
    }

    /// Current type record of `poi`. `None` only for a retired POI whose type
    /// has since been deleted.
    pub fn type_of(&self, poi: &Poi) -> Option<&PoiType> {
        self.types.get(&poi.type_key)
    }

    /// Type names, sorted ascending.
    pub fn list_types(&self) -> Vec<&str> {
        self.type_index.keys().map(String::as_str).collect()
    }

    pub fn poi(&self, id: i64) -> Option<&Poi> {
        self.pois.get(&id)
    }

    /// Live POIs in id order.
    pub fn pois(&self) -> impl Iterator<Item = &Poi> {
        self.pois.values()
    }

    pub fn visitor(&self, id: i64) -> Option<&Visitor> {
        self.visitors.get(&id)
    }

    /// Visitors in id order.
    pub fn visitors(&self) -> impl Iterator<Item = &Visitor> {
        self.visitors.values()
    }

    /// Every recorded visit, in recording order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Raw number of visit records for a POI, revisits included.
    pub fn poi_visit_count(&self, poi_id: i64) -> usize {
        self.visits.iter().filter(|v| v.poi_id == poi_id).count()
    }

    /// True if `id` belongs to a live POI or was retired by a deletion.
    pub fn is_poi_id_used(&self, id: i64) -> bool {
        self.pois.contains_key(&id) || self.retired_pois.contains_key(&id)
    }

    pub(crate) fn type_key(&self, name: &str) -> Option<TypeKey> {
        self.type_index
            .get(&validation::normalize_type_name(name))
            .copied()
    }

    /// Live POI or, failing that, a retired one.
    pub(crate) fn poi_any(&self, id: i64) -> Option<&Poi> {
        self.pois.get(&id).or_else(|| self.retired_pois.get(&id))
    }

    // --- POIs ---

    /// Adds a POI of an existing type.
    ///
    /// `values` is stored as given; it is not checked against the type's
    /// attribute list. Ids are never recycled, so an id that belonged to a
    /// deleted POI is rejected with [`RegistryError::DuplicateId`].
    pub fn add_poi(
        &mut self,
        id: i64,
        name: &str,
        type_name: &str,
        x: i64,
        y: i64,
        values: AttrValues,
    ) -> Result<&Poi> {
        if self.is_poi_id_used(id) {
            return Err(RegistryError::DuplicateId {
                entity: Entity::Poi,
                id,
            });
        }
        let type_key = self
            .type_key(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
        let coordinate = validation::validate_coordinate(x, y)?;

        log::debug!("Adding POI {} '{}' at {}", id, name, coordinate);

        let poi = Poi {
            id,
            name: name.to_string(),
            type_key,
            coordinate,
            values,
        };
        Ok(self.pois.entry(id).or_insert(poi))
    }

    /// Removes a POI from the live set. Its id stays retired.
    ///
    /// Returns whether a live POI was removed.
    pub fn delete_poi(&mut self, id: i64) -> bool {
        match self.pois.remove(&id) {
            Some(poi) => {
                log::debug!("Deleted POI {}; id retired", id);
                self.retired_pois.insert(id, poi);
                true
            }
            None => false,
        }
    }

    /// Sets one attribute value on a POI. The attribute must be part of the
    /// POI type's current schema.
    pub fn set_poi_value(
        &mut self,
        poi_id: i64,
        attribute: &str,
        value: impl Into<AttrValue>,
    ) -> Result<()> {
        let poi = self
            .pois
            .get_mut(&poi_id)
            .ok_or(RegistryError::UnknownPoi(poi_id))?;
        let poi_type = self
            .types
            .get(&poi.type_key)
            .ok_or_else(|| RegistryError::UnknownType(format!("{:?}", poi.type_key)))?;

        let attribute = attribute.trim();
        if !poi_type.has_attribute(attribute) {
            return Err(RegistryError::UnknownAttribute {
                type_name: poi_type.name.clone(),
                attribute: attribute.to_string(),
            });
        }

        let value = value.into();
        log::debug!("Set POI {} attribute '{}' to {:?}", poi_id, attribute, value);
        poi.values.insert(attribute.to_string(), value);
        Ok(())
    }

    // --- visitors & visits ---

    /// Adds a visitor.
    ///
    /// Unlike POIs there is no retired-id tracking for visitors: only a live
    /// visitor with the same id causes [`RegistryError::DuplicateId`].
    pub fn add_visitor(&mut self, id: i64, name: &str, nationality: &str) -> Result<&Visitor> {
        if self.visitors.contains_key(&id) {
            return Err(RegistryError::DuplicateId {
                entity: Entity::Visitor,
                id,
            });
        }

        log::debug!("Adding visitor {} '{}'", id, name);

        let visitor = Visitor {
            id,
            name: name.to_string(),
            nationality: nationality.to_string(),
        };
        Ok(self.visitors.entry(id).or_insert(visitor))
    }

    /// Appends a visit of a live POI by a known visitor.
    ///
    /// The date must be `dd/mm/yyyy`; the rating, when given, must reduce to
    /// an integer in `[1, 10]` (`7.0` is accepted as `7`). Visits are never
    /// deduplicated.
    pub fn record_visit(
        &mut self,
        visitor_id: i64,
        poi_id: i64,
        date: &str,
        rating: Option<f64>,
    ) -> Result<&Visit> {
        if !self.visitors.contains_key(&visitor_id) {
            return Err(RegistryError::UnknownVisitor(visitor_id));
        }
        if !self.pois.contains_key(&poi_id) {
            return Err(RegistryError::UnknownPoi(poi_id));
        }
        let date = validation::validate_date(date)?;
        let rating = rating.map(validation::validate_rating).transpose()?;

        log::debug!(
            "Recording visit: visitor {} -> POI {} on {}",
            visitor_id,
            poi_id,
            date
        );

        self.visits.push(Visit {
            visitor_id,
            poi_id,
            date,
            rating,
        });
        let last = self.visits.len() - 1;
        Ok(&self.visits[last])
    }

    /// Live POIs of one type.
    pub(crate) fn pois_of_type(&self, key: TypeKey) -> impl Iterator<Item = &Poi> {
        self.pois.values().filter(move |p| p.type_key == key)
    }

    pub(crate) fn pois_of_type_mut(&mut self, key: TypeKey) -> impl Iterator<Item = &mut Poi> {
        self.pois.values_mut().filter(move |p| p.type_key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_type() -> Registry {
        let mut reg = Registry::new();
        reg.add_type("Forest", ["area", "protected"]).unwrap();
        reg
    }

    #[test]
    fn test_add_poi_requires_type() {
        let mut reg = registry_with_type();
        let err = reg
            .add_poi(1, "Nowhere", "desert", 1, 1, AttrValues::new())
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownType(_)));

        let poi = reg
            .add_poi(1, "Cedar Grove", " FOREST ", 120, 220, AttrValues::new())
            .unwrap();
        assert_eq!(poi.coordinate().x(), 120);
        assert_eq!(reg.type_of(reg.poi(1).unwrap()).unwrap().name(), "forest");
    }

    #[test]
    fn test_add_poi_rejects_bad_coordinate() {
        let mut reg = registry_with_type();
        let err = reg
            .add_poi(1, "Edge", "forest", 1000, 0, AttrValues::new())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidCoordinate { .. }));
        assert!(reg.poi(1).is_none());
        assert!(!reg.is_poi_id_used(1));
    }

    #[test]
    fn test_poi_ids_are_never_reused() {
        let mut reg = registry_with_type();
        reg.add_poi(5, "A", "forest", 0, 0, AttrValues::new()).unwrap();
        assert!(reg.delete_poi(5));
        assert!(!reg.delete_poi(5));

        let err = reg
            .add_poi(5, "B", "forest", 1, 1, AttrValues::new())
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::DuplicateId {
                entity: Entity::Poi,
                id: 5
            }
        ));
        assert_eq!(reg.stats().retired_poi_ids, 1);
    }

    #[test]
    fn test_duplicate_visitor() {
        let mut reg = Registry::new();
        reg.add_visitor(1, "Bob", "BG").unwrap();
        assert!(matches!(
            reg.add_visitor(1, "Bob again", "BG"),
            Err(RegistryError::DuplicateId {
                entity: Entity::Visitor,
                ..
            })
        ));
    }

    #[test]
    fn test_record_visit_validation_order() {
        let mut reg = registry_with_type();
        reg.add_poi(400, "Natl Museum", "forest", 50, 50, AttrValues::new())
            .unwrap();
        reg.add_visitor(1, "Bob", "BG").unwrap();

        assert!(matches!(
            reg.record_visit(2, 400, "bad", None),
            Err(RegistryError::UnknownVisitor(2))
        ));
        assert!(matches!(
            reg.record_visit(1, 401, "bad", None),
            Err(RegistryError::UnknownPoi(401))
        ));
        assert!(matches!(
            reg.record_visit(1, 400, "01-10-2025", None),
            Err(RegistryError::InvalidDate(_))
        ));
        assert!(matches!(
            reg.record_visit(1, 400, "30/09/2025", Some(4.5)),
            Err(RegistryError::InvalidRating(_))
        ));
        assert!(reg.visits().is_empty());

        let visit = reg.record_visit(1, 400, "30/09/2025", Some(4.0)).unwrap();
        assert_eq!(visit.rating(), Some(4));
        assert_eq!(visit.date().to_string(), "30/09/2025");
    }

    #[test]
    fn test_visits_to_deleted_poi_are_rejected() {
        let mut reg = registry_with_type();
        reg.add_poi(1, "A", "forest", 0, 0, AttrValues::new()).unwrap();
        reg.add_visitor(1, "Bob", "BG").unwrap();
        reg.delete_poi(1);
        assert!(matches!(
            reg.record_visit(1, 1, "01/01/2025", None),
            Err(RegistryError::UnknownPoi(1))
        ));
    }

    #[test]
    fn test_set_poi_value_requires_schema_attribute() {
        let mut reg = registry_with_type();
        reg.add_poi(1, "A", "forest", 0, 0, AttrValues::new()).unwrap();

        reg.set_poi_value(1, "area", 350_i64).unwrap();
        assert_eq!(reg.poi(1).unwrap().values()["area"], AttrValue::Integer(350));

        assert!(matches!(
            reg.set_poi_value(1, "height", 3_i64),
            Err(RegistryError::UnknownAttribute { .. })
        ));
        assert!(matches!(
            reg.set_poi_value(2, "area", 3_i64),
            Err(RegistryError::UnknownPoi(2))
        ));
    }

    struct CaptureLogger;

    static CAPTURED: std::sync::Mutex<Vec<String>> = std::sync::Mutex::new(Vec::new());
    static LOGGER: CaptureLogger = CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Debug
        }

        fn log(&self, record: &log::Record) {
            if let Ok(mut lines) = CAPTURED.lock() {
                lines.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_set_poi_value_logs_mutation() {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);

        let mut reg = registry_with_type();
        reg.add_poi(7_001, "Logged", "forest", 5, 5, AttrValues::new())
            .unwrap();
        reg.set_poi_value(7_001, "protected", true).unwrap();

        let lines = CAPTURED.lock().unwrap();
        assert!(
            lines
                .iter()
                .any(|l| l.contains("POI 7001") && l.contains("'protected'")),
            "no debug line for set_poi_value in {:?}",
            *lines
        );
    }

    #[test]
    fn test_poi_visit_count_includes_revisits() {
        let mut reg = registry_with_type();
        reg.add_poi(1, "A", "forest", 0, 0, AttrValues::new()).unwrap();
        reg.add_visitor(1, "Bob", "BG").unwrap();
        reg.record_visit(1, 1, "01/10/2025", None).unwrap();
        reg.record_visit(1, 1, "01/10/2025", None).unwrap();
        assert_eq!(reg.poi_visit_count(1), 2);
        assert_eq!(reg.poi_visit_count(2), 0);
    }
}
