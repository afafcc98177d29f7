//! Spatial search over POI coordinates.
//!
//! All searches are linear scans (closest pair is an exhaustive pairwise
//! scan) and return rows in a total order: distance ascending, then POI id,
//! then POI name.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::model::{Coordinate, EPSILON, Poi};

/// True when `a` and `b` differ by at most [`EPSILON`].
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

/// Compound ordering used by every spatial result list.
pub fn cmp_by_distance(a: &(&Poi, f64), b: &(&Poi, f64)) -> Ordering {
    a.1.total_cmp(&b.1)
        .then_with(|| a.0.id.cmp(&b.0.id))
        .then_with(|| a.0.name.cmp(&b.0.name))
}

/// Heap entry; the max-heap keeps the worst of the current best `k` on top.
struct KnnEntry<'a> {
    poi: &'a Poi,
    distance: f64,
}

impl PartialEq for KnnEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KnnEntry<'_> {}

impl PartialOrd for KnnEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KnnEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_by_distance(&(self.poi, self.distance), &(other.poi, other.distance))
    }
}

/// The `k` POIs closest to `center`.
///
/// Uses a bounded max-heap, so the result is exactly the first `k` rows of
/// the fully sorted list.
pub fn nearest_k<'a, I>(pois: I, center: &Coordinate, k: usize) -> Vec<(&'a Poi, f64)>
where
    I: IntoIterator<Item = &'a Poi>,
{
    if k == 0 {
        return Vec::new();
    }

    let pois = pois.into_iter();
    let mut heap: BinaryHeap<KnnEntry<'a>> =
        BinaryHeap::with_capacity(k.min(pois.size_hint().0));
    for poi in pois {
        let entry = KnnEntry {
            poi,
            distance: poi.coordinate.distance_to(center),
        };
        if heap.len() < k {
            heap.push(entry);
        } else if let Some(worst) = heap.peek()
            && entry < *worst
        {
            heap.pop();
            heap.push(entry);
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|e| (e.poi, e.distance))
        .collect()
}

/// POIs whose distance to `center` is at most `radius`, boundary included
/// within [`EPSILON`]. A negative or NaN radius yields nothing.
pub fn within_radius<'a, I>(pois: I, center: &Coordinate, radius: f64) -> Vec<(&'a Poi, f64)>
where
    I: IntoIterator<Item = &'a Poi>,
{
    filter_sorted(pois, center, radius, |d| d < radius || approx_eq(d, radius))
}

/// POIs lying on the circle of `radius` around `center`, within [`EPSILON`].
pub fn on_boundary<'a, I>(pois: I, center: &Coordinate, radius: f64) -> Vec<(&'a Poi, f64)>
where
    I: IntoIterator<Item = &'a Poi>,
{
    filter_sorted(pois, center, radius, |d| approx_eq(d, radius))
}

fn filter_sorted<'a, I, F>(pois: I, center: &Coordinate, radius: f64, keep: F) -> Vec<(&'a Poi, f64)>
where
    I: IntoIterator<Item = &'a Poi>,
    F: Fn(f64) -> bool,
{
    if radius.is_nan() || radius < 0.0 {
        return Vec::new();
    }
    let mut hits: Vec<(&Poi, f64)> = pois
        .into_iter()
        .map(|poi| (poi, poi.coordinate.distance_to(center)))
        .filter(|&(_, d)| keep(d))
        .collect();
    hits.sort_by(cmp_by_distance);
    hits
}

/// The two POIs closest to each other.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPair<'a> {
    /// Lower id of the pair.
    pub first: &'a Poi,
    /// Higher id of the pair.
    pub second: &'a Poi,
    pub distance: f64,
}

impl ClosestPair<'_> {
    fn tie_key(&self) -> (i64, i64, &str, &str) {
        let (a, b) = (self.first.name.as_str(), self.second.name.as_str());
        (self.first.id, self.second.id, a.min(b), a.max(b))
    }
}

/// Exhaustive O(n²) closest-pair scan.
///
/// A candidate replaces the current best only when it is shorter by more
/// than [`EPSILON`]; candidates within [`EPSILON`] of the best win when their
/// `(min id, max id, min name, max name)` key is smaller. Returns `None` for
/// fewer than two POIs.
pub fn closest_pair<'a>(pois: &[&'a Poi]) -> Option<ClosestPair<'a>> {
    let mut best: Option<ClosestPair<'a>> = None;

    for (i, a) in pois.iter().enumerate() {
        for b in &pois[i + 1..] {
            let (first, second) = if a.id <= b.id { (*a, *b) } else { (*b, *a) };
            let candidate = ClosestPair {
                first,
                second,
                distance: a.distance_to(b),
            };

            best = match best {
                None => Some(candidate),
                Some(current) if candidate.distance < current.distance - EPSILON => Some(candidate),
                Some(current)
                    if approx_eq(candidate.distance, current.distance)
                        && candidate.tie_key() < current.tie_key() =>
                {
                    Some(candidate)
                }
                keep => keep,
            };
        }
    }

    best
}
