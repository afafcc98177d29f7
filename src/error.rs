//! Error types for the registry and its seed loader.

use thiserror::Error;

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Kind of entity an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Poi,
    Visitor,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Poi => f.write_str("POI"),
            Entity::Visitor => f.write_str("visitor"),
        }
    }
}

/// Every failure the registry can surface.
///
/// Failures are raised synchronously by the call that triggered them and
/// never leave a half-applied mutation behind.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Malformed or out-of-range argument (empty names, negative thresholds).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid coordinate ({x}, {y}): components must be integers in [0, {max})", max = crate::model::MAP_SIZE)]
    InvalidCoordinate { x: f64, y: f64 },

    #[error("Invalid date '{0}': expected a calendar date in dd/mm/yyyy form")]
    InvalidDate(String),

    #[error("Invalid rating {0}: must be an integer in [1, 10]")]
    InvalidRating(f64),

    #[error("POI type '{0}' already exists")]
    DuplicateType(String),

    /// POI ids collide with live and retired ids, visitor ids only with live ones.
    #[error("{entity} id {id} is already in use")]
    DuplicateId { entity: Entity, id: i64 },

    #[error("Unknown POI type '{0}'")]
    UnknownType(String),

    #[error("Unknown POI id {0}")]
    UnknownPoi(i64),

    #[error("Unknown visitor id {0}")]
    UnknownVisitor(i64),

    #[error("Cannot delete type '{0}': it is used by existing POIs")]
    TypeInUse(String),

    #[error("Attribute '{attribute}' already exists on type '{type_name}'")]
    DuplicateAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("Attribute '{attribute}' is not defined on type '{type_name}'")]
    UnknownAttribute {
        type_name: String,
        attribute: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A seed record has the wrong shape.
    #[error("{location}: {reason}")]
    InvalidDocument { location: String, reason: String },

    /// A seed record was rejected by the registry.
    #[error("{location}: {source}")]
    Load {
        location: String,
        #[source]
        source: Box<RegistryError>,
    },
}

impl RegistryError {
    /// Wraps `self` with the location of the seed record that caused it.
    pub fn at(self, location: impl Into<String>) -> Self {
        RegistryError::Load {
            location: location.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `Load` location wrappers.
    pub fn root(&self) -> &RegistryError {
        match self {
            RegistryError::Load { source, .. } => source.root(),
            other => other,
        }
    }
}
