//! Catalog inspection commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sysbot_core::{
    CatalogDump, CatalogRegistry, GameFamily, OffsetCatalog, SessionConfig, load_catalog,
    save_catalog,
};
use tracing::info;

/// Builtin catalogs plus every catalog file in `extra`
pub fn build_registry(extra: &[PathBuf]) -> Result<CatalogRegistry> {
    let mut registry = CatalogRegistry::builtin()?;
    for path in extra {
        let catalog = load_catalog(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?;
        registry.register(catalog)?;
    }
    Ok(registry)
}

/// Pick a catalog, defaulting to the family's builtin version
pub fn select<'a>(
    registry: &'a CatalogRegistry,
    family: GameFamily,
    version: Option<&str>,
) -> Result<&'a OffsetCatalog> {
    let mut builder = SessionConfig::builder(family);
    if let Some(version) = version {
        builder = builder.version(version);
    }
    let config = builder.build();
    Ok(registry.get(config.family, &config.version)?)
}

/// Run the catalogs command
pub fn list(registry: &CatalogRegistry) {
    println!("{} offset catalogs:", registry.len());
    for catalog in registry.iter() {
        println!(
            "  {:<10} chains={:<3} bases={:<3} shifts={}",
            catalog.key(),
            catalog.chains().count(),
            catalog.bases().count(),
            catalog.shifts().count()
        );
    }
}

/// Run the catalog command
pub fn show(catalog: &OffsetCatalog, output: Option<&Path>) -> Result<()> {
    let dump = CatalogDump::from_catalog(catalog);

    if let Some(path) = output {
        dump.save(path)?;
        println!("Dump saved to: {}", path.display());
    } else {
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }
    Ok(())
}

/// Run the export command
pub fn export(catalog: &OffsetCatalog, output: &Path) -> Result<()> {
    save_catalog(output, catalog)?;
    info!("Exported catalog {} to {}", catalog.key(), output.display());
    println!("Catalog saved to: {}", output.display());
    Ok(())
}
