//! Read-only queries over the registry.
//!
//! Every query returns a fully materialized, already ordered `Vec` that can
//! be iterated any number of times. Spatial, ranking, count and coverage
//! queries see live POIs only.

use rustc_hash::FxHashSet;
use std::cmp::Ordering;

use super::Registry;
use crate::compute::ranking;
use crate::compute::spatial::{self, ClosestPair};
use crate::compute::validation;
use crate::error::{RegistryError, Result};
use crate::model::{AttrValue, Poi, Visit, VisitDate, Visitor};

static ABSENT: AttrValue = AttrValue::Absent;

/// Attribute values of a POI laid out along its type's current schema.
pub type SchemaValues<'a> = Vec<(&'a str, &'a AttrValue)>;

/// One visit, seen from the visitor's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoiVisit<'a> {
    pub poi: &'a Poi,
    pub date: VisitDate,
    pub rating: Option<u8>,
}

/// One visit, seen from the POI's side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisitorVisit<'a> {
    pub visitor: &'a Visitor,
    pub date: VisitDate,
    pub rating: Option<u8>,
}

/// A visitor together with their distinct POI and type coverage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageRow<'a> {
    pub visitor: &'a Visitor,
    pub poi_count: usize,
    pub type_count: usize,
}

impl Registry {
    // --- spatial ---

    /// The `k` live POIs nearest to `(x, y)`, ordered by distance, id, name.
    pub fn nearest_k(&self, x: i64, y: i64, k: usize) -> Result<Vec<(&Poi, f64)>> {
        let center = validation::validate_coordinate(x, y)?;
        Ok(spatial::nearest_k(self.pois.values(), &center, k))
    }

    /// Live POIs within `radius` of `(x, y)`, boundary included.
    pub fn within_radius(&self, x: i64, y: i64, radius: f64) -> Result<Vec<(&Poi, f64)>> {
        let center = validation::validate_coordinate(x, y)?;
        Ok(spatial::within_radius(self.pois.values(), &center, radius))
    }

    /// Live POIs at distance `radius` from `(x, y)`, within epsilon.
    pub fn exactly_on_boundary(&self, x: i64, y: i64, radius: f64) -> Result<Vec<(&Poi, f64)>> {
        let center = validation::validate_coordinate(x, y)?;
        Ok(spatial::on_boundary(self.pois.values(), &center, radius))
    }

    /// The closest pair of live POIs, or `None` with fewer than two.
    pub fn closest_pair_pois(&self) -> Option<ClosestPair<'_>> {
        let pois: Vec<&Poi> = self.pois.values().collect();
        spatial::closest_pair(&pois)
    }

    // --- aggregates & rankings ---

    /// POI count for every type, zero-count types included. Ordered by count
    /// descending, then type name.
    pub fn counts_per_type(&self) -> Vec<(&str, usize)> {
        let mut rows: Vec<(&str, usize)> = self
            .type_index
            .iter()
            .map(|(name, &key)| (name.as_str(), self.pois_of_type(key).count()))
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }

    /// Top `k` visited POIs by number of distinct visitors.
    pub fn top_k_pois_by_distinct_visitors(&self, k: usize) -> Vec<(&Poi, usize)> {
        if k == 0 {
            return Vec::new();
        }
        let rows = ranking::visitors_per_poi(&self.visits)
            .into_iter()
            .filter_map(|(poi_id, visitors)| Some((self.pois.get(&poi_id)?, visitors.len())))
            .collect();
        ranking::top_k(rows, k)
    }

    /// Top `k` visitors by number of distinct live POIs visited.
    pub fn top_k_visitors_by_distinct_pois(&self, k: usize) -> Vec<(&Visitor, usize)> {
        if k == 0 {
            return Vec::new();
        }
        let rows = ranking::pois_per_visitor(self.live_visits())
            .into_iter()
            .filter_map(|(visitor_id, pois)| Some((self.visitors.get(&visitor_id)?, pois.len())))
            .collect();
        ranking::top_k(rows, k)
    }

    /// Distinct visitor count for every live POI, unvisited ones included.
    pub fn counts_distinct_visitors_per_poi(&self) -> Vec<(&Poi, usize)> {
        let distinct = ranking::visitors_per_poi(&self.visits);
        let mut rows: Vec<(&Poi, usize)> = self
            .pois
            .values()
            .map(|poi| (poi, distinct.get(&poi.id).map_or(0, |s| s.len())))
            .collect();
        rows.sort_by(ranking::cmp_ranked);
        rows
    }

    /// Distinct live POI count for every visitor, non-visitors included.
    pub fn counts_distinct_pois_per_visitor(&self) -> Vec<(&Visitor, usize)> {
        let distinct = ranking::pois_per_visitor(self.live_visits());
        let mut rows: Vec<(&Visitor, usize)> = self
            .visitors
            .values()
            .map(|v| (v, distinct.get(&v.id).map_or(0, |s| s.len())))
            .collect();
        rows.sort_by(ranking::cmp_ranked);
        rows
    }

    /// Visitors who visited at least `min_pois` distinct POIs spanning at
    /// least `min_types` distinct types.
    ///
    /// Ordered by POI count descending, type count descending, id, name.
    pub fn visitors_meeting_coverage(
        &self,
        min_pois: i64,
        min_types: i64,
    ) -> Result<Vec<CoverageRow<'_>>> {
        if min_pois < 0 || min_types < 0 {
            return Err(RegistryError::InvalidArgument(format!(
                "Coverage thresholds must be non-negative (m={}, t={})",
                min_pois, min_types
            )));
        }
        let distinct = ranking::pois_per_visitor(self.live_visits());

        let mut rows: Vec<CoverageRow<'_>> = self
            .visitors
            .values()
            .map(|visitor| {
                let pois = distinct.get(&visitor.id);
                let types: FxHashSet<_> = pois
                    .into_iter()
                    .flatten()
                    .filter_map(|id| self.pois.get(id))
                    .map(|poi| poi.type_key)
                    .collect();
                CoverageRow {
                    visitor,
                    poi_count: pois.map_or(0, |s| s.len()),
                    type_count: types.len(),
                }
            })
            .filter(|row| row.poi_count as i64 >= min_pois && row.type_count as i64 >= min_types)
            .collect();

        rows.sort_by(|a, b| {
            b.poi_count
                .cmp(&a.poi_count)
                .then_with(|| b.type_count.cmp(&a.type_count))
                .then_with(|| a.visitor.id.cmp(&b.visitor.id))
                .then_with(|| a.visitor.name.cmp(&b.visitor.name))
        });
        Ok(rows)
    }

    // --- listings ---

    /// Every live POI of a type with values laid out along the type's current
    /// attribute list. Attributes a POI never set read as
    /// [`AttrValue::Absent`]; stored keys outside the schema are left out.
    /// An unknown type yields no rows.
    pub fn list_pois_of_type_with_values(&self, type_name: &str) -> Vec<(&Poi, SchemaValues<'_>)> {
        let Some(key) = self.type_key(type_name) else {
            return Vec::new();
        };
        let Some(poi_type) = self.types.get(&key) else {
            return Vec::new();
        };

        let mut rows: Vec<(&Poi, SchemaValues<'_>)> = self
            .pois_of_type(key)
            .map(|poi| {
                let values = poi_type
                    .attributes
                    .iter()
                    .map(|attr| (attr.as_str(), poi.values.get(attr).unwrap_or(&ABSENT)))
                    .collect();
                (poi, values)
            })
            .collect();
        rows.sort_by(|a, b| a.0.id.cmp(&b.0.id).then_with(|| a.0.name.cmp(&b.0.name)));
        rows
    }

    /// All visits of one visitor, ordered by date, POI id, POI name.
    ///
    /// Visits to POIs deleted since are still listed.
    pub fn list_visited_pois_for_visitor(&self, visitor_id: i64) -> Result<Vec<PoiVisit<'_>>> {
        if !self.visitors.contains_key(&visitor_id) {
            return Err(RegistryError::UnknownVisitor(visitor_id));
        }
        let mut rows: Vec<PoiVisit<'_>> = self
            .visits
            .iter()
            .filter(|v| v.visitor_id == visitor_id)
            .filter_map(|v| {
                Some(PoiVisit {
                    poi: self.poi_any(v.poi_id)?,
                    date: v.date,
                    rating: v.rating,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.poi.id.cmp(&b.poi.id))
                .then_with(|| a.poi.name.cmp(&b.poi.name))
        });
        Ok(rows)
    }

    /// Visitors of one live POI.
    ///
    /// With `distinct == false` every visit is a row, ordered by date,
    /// visitor id, visitor name. With `distinct == true` each visitor appears
    /// once with their earliest visit, ordered by visitor id, visitor name.
    pub fn list_visitors_for_poi(&self, poi_id: i64, distinct: bool) -> Result<Vec<VisitorVisit<'_>>> {
        if !self.pois.contains_key(&poi_id) {
            return Err(RegistryError::UnknownPoi(poi_id));
        }
        let mut rows: Vec<VisitorVisit<'_>> = self
            .visits
            .iter()
            .filter(|v| v.poi_id == poi_id)
            .filter_map(|v| {
                Some(VisitorVisit {
                    visitor: self.visitors.get(&v.visitor_id)?,
                    date: v.date,
                    rating: v.rating,
                })
            })
            .collect();

        let by_visitor = |a: &VisitorVisit<'_>, b: &VisitorVisit<'_>| -> Ordering {
            a.visitor
                .id
                .cmp(&b.visitor.id)
                .then_with(|| a.visitor.name.cmp(&b.visitor.name))
        };

        if distinct {
            // Stable sort keeps recording order among equal dates, so the
            // first row per visitor is their earliest recorded visit.
            rows.sort_by(|a, b| by_visitor(a, b).then_with(|| a.date.cmp(&b.date)));
            rows.dedup_by_key(|row| row.visitor.id);
        } else {
            rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| by_visitor(a, b)));
        }
        Ok(rows)
    }

    /// Visits whose POI is still live.
    fn live_visits(&self) -> impl Iterator<Item = &Visit> {
        self.visits
            .iter()
            .filter(|v| self.pois.contains_key(&v.poi_id))
    }
}
