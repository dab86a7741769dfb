//! The authored set of memories available in a world.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::{DefinitionError, DefinitionId, MemoryDefinition};

/// Every memory definition a session can offer, keyed by id.
///
/// Definitions are shared behind `Arc` so that records held at runtime point
/// at the same immutable template the catalog owns.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    definitions: BTreeMap<DefinitionId, Arc<MemoryDefinition>>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "memory")]
    memories: Vec<MemoryDefinition>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validated definition. Ids must be unique.
    pub fn insert(
        &mut self,
        definition: MemoryDefinition,
    ) -> Result<Arc<MemoryDefinition>, DefinitionError> {
        definition.validate()?;
        if self.definitions.contains_key(&definition.id) {
            return Err(DefinitionError::Duplicate(definition.id));
        }
        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.id.clone(), Arc::clone(&definition));
        Ok(definition)
    }

    /// Parse a catalog from TOML made of `[[memory]]` tables.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        let mut catalog = Self::new();
        for definition in file.memories {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn get(&self, id: &DefinitionId) -> Option<Arc<MemoryDefinition>> {
        self.definitions.get(id).cloned()
    }

    /// Definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MemoryDefinition>> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Errors raised while loading a memory catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO failure when reading catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
