//! Registry builder for seeding at construction time
//!
//! This module provides a builder pattern for creating a registry that is
//! pre-populated from one or more seed documents.

use std::path::PathBuf;

use crate::error::Result;
use crate::loader::{self, SeedDocument};
use crate::registry::Registry;

#[derive(Debug)]
enum Seed {
    Document(SeedDocument),
    JsonFile(PathBuf),
    #[cfg(feature = "toml")]
    TomlFile(PathBuf),
}

/// Builder that applies seeds in the order they were added.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    seeds: Vec<Seed>,
}

impl RegistryBuilder {
    /// Create a builder for an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from an in-memory document.
    pub fn seed(mut self, document: SeedDocument) -> Self {
        self.seeds.push(Seed::Document(document));
        self
    }

    /// Seed from a JSON file, read when [`build`](Self::build) runs.
    pub fn seed_json<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.seeds.push(Seed::JsonFile(path.into()));
        self
    }

    /// Seed from a TOML file, read when [`build`](Self::build) runs.
    #[cfg(feature = "toml")]
    pub fn seed_toml<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.seeds.push(Seed::TomlFile(path.into()));
        self
    }

    /// Build the registry, applying every seed.
    pub fn build(self) -> Result<Registry> {
        let mut registry = Registry::new();
        for seed in self.seeds {
            let document = match seed {
                Seed::Document(document) => document,
                Seed::JsonFile(path) => {
                    log::debug!("Reading JSON seed from {}", path.display());
                    SeedDocument::from_json_file(&path)?
                }
                #[cfg(feature = "toml")]
                Seed::TomlFile(path) => {
                    log::debug!("Reading TOML seed from {}", path.display());
                    SeedDocument::from_toml_file(&path)?
                }
            };
            loader::load_seed(&mut registry, &document)?;
        }
        Ok(registry)
    }
}
