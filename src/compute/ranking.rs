//! Distinct-membership counting and ranking helpers.
//!
//! Visits are event records and may repeat a (visitor, POI) pair. Every
//! count here is the size of a membership set, never a record count.

use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

use crate::model::{Poi, Visit, Visitor};

/// Entities that can appear in a ranked row.
pub trait Ranked {
    fn rank_id(&self) -> i64;
    fn rank_name(&self) -> &str;
}

impl Ranked for Poi {
    fn rank_id(&self) -> i64 {
        self.id
    }

    fn rank_name(&self) -> &str {
        &self.name
    }
}

impl Ranked for Visitor {
    fn rank_id(&self) -> i64 {
        self.id
    }

    fn rank_name(&self) -> &str {
        &self.name
    }
}

/// POI id -> ids of the visitors who visited it.
pub fn visitors_per_poi<'a, I>(visits: I) -> FxHashMap<i64, FxHashSet<i64>>
where
    I: IntoIterator<Item = &'a Visit>,
{
    let mut distinct: FxHashMap<i64, FxHashSet<i64>> = FxHashMap::default();
    for visit in visits {
        distinct
            .entry(visit.poi_id)
            .or_default()
            .insert(visit.visitor_id);
    }
    distinct
}

/// Visitor id -> ids of the POIs they visited.
pub fn pois_per_visitor<'a, I>(visits: I) -> FxHashMap<i64, FxHashSet<i64>>
where
    I: IntoIterator<Item = &'a Visit>,
{
    let mut distinct: FxHashMap<i64, FxHashSet<i64>> = FxHashMap::default();
    for visit in visits {
        distinct
            .entry(visit.visitor_id)
            .or_default()
            .insert(visit.poi_id);
    }
    distinct
}

/// Count descending, then id ascending, then name ascending.
pub fn cmp_ranked<T: Ranked>(a: &(&T, usize), b: &(&T, usize)) -> Ordering {
    b.1.cmp(&a.1)
        .then_with(|| a.0.rank_id().cmp(&b.0.rank_id()))
        .then_with(|| a.0.rank_name().cmp(b.0.rank_name()))
}

/// Sorts rows with [`cmp_ranked`] and keeps the first `k`.
pub fn top_k<T: Ranked>(mut rows: Vec<(&T, usize)>, k: usize) -> Vec<(&T, usize)> {
    rows.sort_by(cmp_ranked);
    rows.truncate(k);
    rows
}
