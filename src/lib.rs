//! In-memory catalog of points of interest, their types, visitors and visits.
//!
//! POIs sit on a 1000×1000 integer grid. The [`Registry`] owns every entity
//! and answers spatial queries (nearest-k, radius, boundary, closest pair)
//! and visit aggregates (distinct-count rankings, coverage) with
//! deterministic tie-breaking.
//!
//! ```rust
//! use poi_registry::{AttrValues, Registry};
//!
//! let mut reg = Registry::new();
//! reg.add_type("forest", ["area", "protected"])?;
//! reg.add_poi(1, "A", "forest", 0, 0, AttrValues::new())?;
//! reg.add_poi(2, "B", "forest", 3, 4, AttrValues::new())?;
//! reg.add_poi(3, "C", "forest", 10, 0, AttrValues::new())?;
//!
//! let nearest = reg.nearest_k(0, 0, 2)?;
//! assert_eq!(nearest[1].0.name(), "B");
//! assert_eq!(nearest[1].1, 5.0);
//!
//! let on_circle = reg.exactly_on_boundary(0, 0, 5.0)?;
//! assert_eq!(on_circle.len(), 1);
//! # Ok::<(), poi_registry::RegistryError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod error;
pub mod loader;
pub mod model;
pub mod registry;

pub use builder::RegistryBuilder;
pub use error::{Entity, RegistryError, Result};
pub use loader::{SeedDocument, load_seed};
pub use model::{
    AttrValue, AttrValues, Coordinate, EPSILON, MAP_SIZE, Poi, PoiType, TypeKey, Visit, VisitDate,
    Visitor,
};
pub use registry::{CoverageRow, PoiVisit, Registry, RegistryStats, SchemaValues, VisitorVisit};

pub use compute::ClosestPair;
pub use compute::validation;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Registry, RegistryBuilder, RegistryError, Result};

    pub use crate::{AttrValue, AttrValues, Coordinate, Poi, PoiType, Visit, VisitDate, Visitor};

    pub use crate::{SeedDocument, load_seed};
}
