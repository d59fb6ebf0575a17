//! Catalogs resolve part names to loaded definitions
//!
//! The scene never reads definition files itself; it asks a [`Catalog`]
//! by name through the [`CatalogSet`] registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::definition::{DefinitionHandle, PartDefinition};

/// Catalog-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Part '{catalog}::{name}' could not be loaded")]
    PartUnavailable { catalog: String, name: String },
    #[error("Unknown catalog: {0}")]
    UnknownCatalog(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
}

/// Source of part definitions
pub trait Catalog {
    /// Catalog name, the first half of a qualified part name
    fn name(&self) -> &str;

    /// Whether `part` can be resolved without error
    fn is_available(&self, part: &str) -> bool;

    /// Resolve a definition by part name
    fn definition_for(&self, part: &str) -> Result<DefinitionHandle, CatalogError>;
}

/// Catalog populated in code
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    name: String,
    definitions: HashMap<String, DefinitionHandle>,
}

impl MemoryCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definitions: HashMap::new(),
        }
    }

    /// Register a definition. Its catalog name is rewritten to this catalog's.
    pub fn insert(&mut self, mut definition: PartDefinition) -> &mut Self {
        definition.catalog = self.name.clone();
        self.definitions
            .insert(definition.name.clone(), definition.into_handle());
        self
    }

    pub fn with(mut self, definition: PartDefinition) -> Self {
        self.insert(definition);
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self, part: &str) -> bool {
        self.definitions.contains_key(part)
    }

    fn definition_for(&self, part: &str) -> Result<DefinitionHandle, CatalogError> {
        self.definitions
            .get(part)
            .cloned()
            .ok_or_else(|| CatalogError::PartUnavailable {
                catalog: self.name.clone(),
                name: part.to_string(),
            })
    }
}

/// Catalog backed by a directory of `<part>.ron` definition files.
/// Definitions are cached after their first successful load.
#[derive(Debug)]
pub struct DirectoryCatalog {
    name: String,
    root: PathBuf,
    cache: RefCell<HashMap<String, DefinitionHandle>>,
}

impl DirectoryCatalog {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_to(&self, part: &str) -> PathBuf {
        self.root.join(format!("{part}.ron"))
    }

    /// Write a definition into the catalog directory
    pub fn save(&self, definition: &PartDefinition) -> Result<(), CatalogError> {
        std::fs::create_dir_all(&self.root).map_err(|e| CatalogError::Io(e.to_string()))?;
        let content = ron::ser::to_string_pretty(definition, ron::ser::PrettyConfig::default())
            .map_err(|e| CatalogError::Serialize(e.to_string()))?;
        std::fs::write(self.path_to(&definition.name), content)
            .map_err(|e| CatalogError::Io(e.to_string()))
    }

    fn load(&self, part: &str) -> Result<DefinitionHandle, CatalogError> {
        let path = self.path_to(part);
        if !path.is_file() {
            return Err(CatalogError::PartUnavailable {
                catalog: self.name.clone(),
                name: part.to_string(),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CatalogError::Io(e.to_string()))?;
        let mut definition: PartDefinition =
            ron::from_str(&content).map_err(|e| CatalogError::Deserialize(e.to_string()))?;
        definition.catalog = self.name.clone();
        definition.name = part.to_string();
        tracing::debug!("Loaded definition {} from {:?}", definition.qualified_name(), path);
        Ok(definition.into_handle())
    }
}

impl Catalog for DirectoryCatalog {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_available(&self, part: &str) -> bool {
        self.cache.borrow().contains_key(part) || self.path_to(part).is_file()
    }

    fn definition_for(&self, part: &str) -> Result<DefinitionHandle, CatalogError> {
        if let Some(handle) = self.cache.borrow().get(part) {
            return Ok(handle.clone());
        }
        let handle = self.load(part)?;
        self.cache
            .borrow_mut()
            .insert(part.to_string(), handle.clone());
        Ok(handle)
    }
}

/// Explicit registry of catalogs, looked up by name
#[derive(Default)]
pub struct CatalogSet {
    catalogs: Vec<Box<dyn Catalog>>,
}

impl CatalogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog; a catalog with the same name is replaced
    pub fn register(&mut self, catalog: impl Catalog + 'static) -> &mut Self {
        let name = catalog.name().to_string();
        self.catalogs.retain(|c| c.name() != name);
        self.catalogs.push(Box::new(catalog));
        self
    }

    pub fn with(mut self, catalog: impl Catalog + 'static) -> Self {
        self.register(catalog);
        self
    }

    pub fn find(&self, name: &str) -> Option<&dyn Catalog> {
        self.catalogs
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.catalogs.iter().map(|c| c.name())
    }

    /// Resolve `catalog::part`
    pub fn definition_for(&self, catalog: &str, part: &str) -> Result<DefinitionHandle, CatalogError> {
        self.find(catalog)
            .ok_or_else(|| CatalogError::UnknownCatalog(catalog.to_string()))?
            .definition_for(part)
    }
}

impl std::fmt::Debug for CatalogSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::Bounds;
    use glam::DVec3;

    fn angle(name: &str) -> PartDefinition {
        PartDefinition::new("ignored", name, Bounds::new(DVec3::ZERO, DVec3::ONE))
    }

    #[test]
    fn test_memory_catalog_rewrites_catalog_name() {
        let catalog = MemoryCatalog::new("Contraptor").with(angle("angle-4"));
        let def = catalog.definition_for("angle-4").unwrap();
        assert_eq!(def.qualified_name(), "Contraptor::angle-4");
        assert!(catalog.is_available("angle-4"));
        assert!(!catalog.is_available("angle-6"));
    }

    #[test]
    fn test_missing_part_is_unavailable() {
        let catalog = MemoryCatalog::new("Contraptor");
        let err = catalog.definition_for("angle-9").unwrap_err();
        assert!(matches!(err, CatalogError::PartUnavailable { .. }));
        assert_eq!(err.to_string(), "Part 'Contraptor::angle-9' could not be loaded");
    }

    #[test]
    fn test_directory_catalog_loads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = DirectoryCatalog::new("Contraptor", dir.path());
        assert!(!catalog.is_available("angle-4"));
        catalog.save(&angle("angle-4")).unwrap();
        assert!(catalog.is_available("angle-4"));

        let first = catalog.definition_for("angle-4").unwrap();
        std::fs::remove_file(catalog.path_to("angle-4")).unwrap();
        let second = catalog.definition_for("angle-4").unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(second.catalog, "Contraptor");
    }

    #[test]
    fn test_directory_catalog_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.ron"), "not ron at all (").unwrap();
        let catalog = DirectoryCatalog::new("Contraptor", dir.path());
        assert!(matches!(
            catalog.definition_for("broken"),
            Err(CatalogError::Deserialize(_))
        ));
    }

    #[test]
    fn test_directory_catalog_save_into_file_fails_with_io() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("Contraptor");
        std::fs::write(&blocker, "").unwrap();
        let catalog = DirectoryCatalog::new("Contraptor", &blocker);
        assert!(matches!(catalog.save(&angle("angle-4")), Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_catalog_set_lookup() {
        let set = CatalogSet::new()
            .with(MemoryCatalog::new("Contraptor").with(angle("angle-4")))
            .with(MemoryCatalog::new("Fasteners"));
        assert!(set.definition_for("Contraptor", "angle-4").is_ok());
        assert!(matches!(
            set.definition_for("Nope", "angle-4"),
            Err(CatalogError::UnknownCatalog(_))
        ));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Contraptor", "Fasteners"]);
    }
}
