use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::{debug, info};

use super::builtin::builtin_catalogs;
use super::catalog::{GameFamily, OffsetCatalog, catalog_key};
use crate::error::{Error, Result};

static GLOBAL: OnceLock<CatalogRegistry> = OnceLock::new();

/// Set of catalogs keyed by family and exact version.
///
/// Registration is additive: a second catalog for an existing key is
/// rejected, never merged.
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    catalogs: BTreeMap<String, OffsetCatalog>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every builtin catalog
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        for catalog in builtin_catalogs()? {
            registry.register(catalog)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, catalog: OffsetCatalog) -> Result<()> {
        let key = catalog.key();
        if self.catalogs.contains_key(&key) {
            return Err(Error::InvalidCatalog(format!(
                "catalog {key} is already registered"
            )));
        }
        debug!("Registered offset catalog {}", key);
        self.catalogs.insert(key, catalog);
        Ok(())
    }

    pub fn get(&self, family: GameFamily, version: &str) -> Result<&OffsetCatalog> {
        let key = catalog_key(family, version);
        self.catalogs
            .get(&key)
            .ok_or(Error::UnsupportedVersion(key))
    }

    /// Look up by catalog key (`SV-3.0.1`)
    pub fn get_by_key(&self, key: &str) -> Result<&OffsetCatalog> {
        self.catalogs
            .get(key)
            .ok_or_else(|| Error::UnsupportedVersion(key.to_string()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OffsetCatalog> {
        self.catalogs.values()
    }

    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}

/// Freeze `registry` as the process-wide catalog set.
///
/// Must be called at startup, before the first [`global`] lookup; fails if
/// a registry is already installed.
pub fn install_global(registry: CatalogRegistry) -> Result<&'static CatalogRegistry> {
    let count = registry.len();
    GLOBAL
        .set(registry)
        .map_err(|_| Error::InvalidCatalog("catalog registry already installed".to_string()))?;
    info!("Installed {} offset catalogs", count);
    global()
}

/// Process-wide catalog set, defaulting to the builtin catalogs
pub fn global() -> Result<&'static CatalogRegistry> {
    if let Some(registry) = GLOBAL.get() {
        return Ok(registry);
    }

    let registry = CatalogRegistry::builtin()?;
    // Another thread may have won the race; either way one registry is live.
    let _ = GLOBAL.set(registry);
    GLOBAL
        .get()
        .ok_or_else(|| Error::InvalidCatalog("catalog registry unavailable".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::{ChainName, SV_VERSION};

    #[test]
    fn test_builtin_registry_lookup() {
        let registry = CatalogRegistry::builtin().unwrap();
        let catalog = registry.get(GameFamily::ScarletViolet, SV_VERSION).unwrap();
        assert_eq!(catalog.version(), "3.0.1");
        assert!(registry.get_by_key("SV-3.0.1").is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let registry = CatalogRegistry::builtin().unwrap();
        let err = registry.get(GameFamily::ScarletViolet, "9.9.9").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(key) if key == "SV-9.9.9"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = CatalogRegistry::builtin().unwrap();
        let existing = registry
            .get(GameFamily::ScarletViolet, SV_VERSION)
            .unwrap()
            .clone();
        assert!(registry.register(existing).is_err());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_global_lookups_are_stable() {
        let first = global()
            .unwrap()
            .get(GameFamily::ScarletViolet, SV_VERSION)
            .unwrap()
            .chain(ChainName::MyStatus)
            .unwrap();
        let second = global()
            .unwrap()
            .get(GameFamily::ScarletViolet, SV_VERSION)
            .unwrap()
            .chain(ChainName::MyStatus)
            .unwrap();

        assert_eq!(first, second);
        assert!(std::ptr::eq(first, second));
    }
}
