//! Bulk loading of a registry from a seed document.
//!
//! A seed document lists types, POIs, visitors and visits, every section
//! optional:
//!
//! ```json
//! {
//!   "types":    [{"name": "museum", "attributes": ["tickets", "open"]}],
//!   "pois":     [{"id": 1, "name": "City", "type": "museum", "x": 10, "y": 10,
//!                 "values": {"tickets": 12, "open": "10:00-18:00"}}],
//!   "visitors": [{"id": 1, "name": "Sam", "nationality": "GE"}],
//!   "visits":   [{"visitor_id": 1, "poi_id": 1, "date": "01/10/2025", "rating": 7}]
//! }
//! ```
//!
//! Records are applied in dependency order. The first rejected record stops
//! the load and is reported with its location (e.g. `$.pois[3]`); records
//! applied before it stay in the registry.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RegistryError, Result};
use crate::model::AttrValues;
use crate::registry::Registry;

/// Whole seed document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDocument {
    #[serde(default)]
    pub types: Vec<TypeRecord>,
    #[serde(default)]
    pub pois: Vec<PoiRecord>,
    #[serde(default)]
    pub visitors: Vec<VisitorRecord>,
    #[serde(default)]
    pub visits: Vec<VisitRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeRecord {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PoiRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub values: AttrValues,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitorRecord {
    pub id: i64,
    pub name: String,
    pub nationality: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitRecord {
    pub visitor_id: i64,
    pub poi_id: i64,
    pub date: String,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl SeedDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
            && self.pois.is_empty()
            && self.visitors.is_empty()
            && self.visits.is_empty()
    }
}

fn require_text(value: &str, location: String) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::InvalidDocument {
            location,
            reason: "must be a non-empty string".to_string(),
        });
    }
    Ok(())
}

/// Applies every record of `document` to `registry`.
pub fn load_seed(registry: &mut Registry, document: &SeedDocument) -> Result<()> {
    apply(registry, document).inspect_err(|e| log::warn!("Seed load failed: {}", e))?;

    log::info!(
        "Loaded seed: {} types, {} POIs, {} visitors, {} visits",
        document.types.len(),
        document.pois.len(),
        document.visitors.len(),
        document.visits.len()
    );
    Ok(())
}

fn apply(registry: &mut Registry, document: &SeedDocument) -> Result<()> {
    for (i, record) in document.types.iter().enumerate() {
        let location = format!("$.types[{}]", i);
        registry
            .add_type(&record.name, &record.attributes)
            .map_err(|e| e.at(location))?;
    }

    for (i, record) in document.pois.iter().enumerate() {
        let location = format!("$.pois[{}]", i);
        require_text(&record.name, format!("{}.name", location))?;
        require_text(&record.type_name, format!("{}.type", location))?;
        registry
            .add_poi(
                record.id,
                &record.name,
                &record.type_name,
                record.x,
                record.y,
                record.values.clone(),
            )
            .map_err(|e| e.at(location))?;
    }

    for (i, record) in document.visitors.iter().enumerate() {
        let location = format!("$.visitors[{}]", i);
        require_text(&record.name, format!("{}.name", location))?;
        require_text(&record.nationality, format!("{}.nationality", location))?;
        registry
            .add_visitor(record.id, &record.name, &record.nationality)
            .map_err(|e| e.at(location))?;
    }

    for (i, record) in document.visits.iter().enumerate() {
        let location = format!("$.visits[{}]", i);
        registry
            .record_visit(record.visitor_id, record.poi_id, &record.date, record.rating)
            .map_err(|e| e.at(location))?;
    }

    Ok(())
}
