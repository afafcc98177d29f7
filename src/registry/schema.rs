//! Type management and attribute-schema migrations.

use super::Registry;
use crate::compute::validation;
use crate::error::{RegistryError, Result};
use crate::model::{AttrValue, PoiType, TypeKey};

impl Registry {
    /// Adds a POI type.
    ///
    /// The name is trimmed and lowercased to form the lookup key. Attribute
    /// names are trimmed and must be non-empty; their order is kept and
    /// duplicates are not removed.
    pub fn add_type<I, S>(&mut self, name: &str, attributes: I) -> Result<&PoiType>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = validation::normalize_type_name(name);
        if key.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "Type name cannot be empty".to_string(),
            ));
        }
        if self.type_index.contains_key(&key) {
            return Err(RegistryError::DuplicateType(key));
        }
        let attributes = attributes
            .into_iter()
            .map(|a| validation::validate_attribute_name(a.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("Adding type '{}' with attributes {:?}", key, attributes);

        let type_key = TypeKey(self.next_type_key);
        self.next_type_key += 1;
        self.type_index.insert(key.clone(), type_key);
        Ok(self.types.entry(type_key).or_insert(PoiType {
            name: key,
            attributes,
        }))
    }

    /// Deletes a type that no live POI references.
    ///
    /// Returns `false` for an unknown type and fails with
    /// [`RegistryError::TypeInUse`] while any POI still uses it.
    pub fn delete_type(&mut self, name: &str) -> Result<bool> {
        let Some(key) = self.type_key(name) else {
            return Ok(false);
        };
        if self.pois_of_type(key).next().is_some() {
            return Err(RegistryError::TypeInUse(
                validation::normalize_type_name(name),
            ));
        }

        if let Some(removed) = self.types.remove(&key) {
            self.type_index.remove(&removed.name);
            log::debug!("Deleted type '{}'", removed.name);
        }
        Ok(true)
    }

    /// Renames a type in place; POIs of the type see the new name.
    pub fn rename_type(&mut self, old: &str, new: &str) -> Result<()> {
        let type_key = self
            .type_key(old)
            .ok_or_else(|| RegistryError::UnknownType(old.to_string()))?;
        let new_key = validation::normalize_type_name(new);
        if new_key.is_empty() {
            return Err(RegistryError::InvalidArgument(
                "Type name cannot be empty".to_string(),
            ));
        }
        match self.type_index.get(&new_key) {
            Some(&existing) if existing == type_key => return Ok(()),
            Some(_) => return Err(RegistryError::DuplicateType(new_key)),
            None => {}
        }

        let poi_type = self
            .types
            .get_mut(&type_key)
            .ok_or_else(|| RegistryError::UnknownType(old.to_string()))?;
        log::debug!("Renaming type '{}' to '{}'", poi_type.name, new_key);

        let old_key = std::mem::replace(&mut poi_type.name, new_key.clone());
        self.type_index.remove(&old_key);
        self.type_index.insert(new_key, type_key);
        Ok(())
    }

    /// Appends an attribute to a type and gives every POI of that type an
    /// explicit [`AttrValue::Absent`] for it, unless the POI already stores
    /// a value under that name.
    pub fn add_attribute_to_type(&mut self, type_name: &str, attribute: &str) -> Result<()> {
        let (type_key, attribute) = self.resolve_attribute(type_name, attribute)?;
        let poi_type = self.type_mut(type_key, type_name)?;
        if poi_type.has_attribute(&attribute) {
            return Err(RegistryError::DuplicateAttribute {
                type_name: poi_type.name.clone(),
                attribute,
            });
        }
        poi_type.attributes.push(attribute.clone());

        let mut migrated = 0usize;
        for poi in self.pois_of_type_mut(type_key) {
            poi.values
                .entry(attribute.clone())
                .or_insert(AttrValue::Absent);
            migrated += 1;
        }
        log::debug!(
            "Added attribute '{}' to type '{}' ({} POIs migrated)",
            attribute,
            type_name.trim(),
            migrated
        );
        Ok(())
    }

    /// Removes an attribute from a type and its key from every POI of that
    /// type. Returns `false` if the type or the attribute is unknown.
    pub fn delete_attribute_from_type(&mut self, type_name: &str, attribute: &str) -> bool {
        let attribute = attribute.trim();
        let Some(type_key) = self.type_key(type_name) else {
            return false;
        };
        let Some(poi_type) = self.types.get_mut(&type_key) else {
            return false;
        };
        let Some(position) = poi_type.attributes.iter().position(|a| a == attribute) else {
            return false;
        };
        poi_type.attributes.remove(position);

        for poi in self.pois_of_type_mut(type_key) {
            poi.values.remove(attribute);
        }
        log::debug!(
            "Deleted attribute '{}' from type '{}'",
            attribute,
            type_name.trim()
        );
        true
    }

    /// Renames an attribute on a type, moving the stored value of every POI
    /// of that type to the new key.
    pub fn rename_attribute_on_type(&mut self, type_name: &str, old: &str, new: &str) -> Result<()> {
        let old = old.trim();
        let (type_key, new) = self.resolve_attribute(type_name, new)?;
        let poi_type = self.type_mut(type_key, type_name)?;

        let Some(position) = poi_type.attributes.iter().position(|a| a == old) else {
            return Err(RegistryError::UnknownAttribute {
                type_name: poi_type.name.clone(),
                attribute: old.to_string(),
            });
        };
        if poi_type.has_attribute(&new) {
            return Err(RegistryError::DuplicateAttribute {
                type_name: poi_type.name.clone(),
                attribute: new,
            });
        }
        poi_type.attributes[position] = new.clone();

        for poi in self.pois_of_type_mut(type_key) {
            if let Some(value) = poi.values.remove(old) {
                poi.values.insert(new.clone(), value);
            }
        }
        log::debug!(
            "Renamed attribute '{}' to '{}' on type '{}'",
            old,
            new,
            type_name.trim()
        );
        Ok(())
    }

    fn resolve_attribute(&self, type_name: &str, attribute: &str) -> Result<(TypeKey, String)> {
        let type_key = self
            .type_key(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))?;
        let attribute = validation::validate_attribute_name(attribute)?;
        Ok((type_key, attribute))
    }

    fn type_mut(&mut self, key: TypeKey, type_name: &str) -> Result<&mut PoiType> {
        self.types
            .get_mut(&key)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_string()))
    }
}
