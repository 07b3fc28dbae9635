use std::fs;
use std::path::Path;

use tracing::info;

use super::catalog::OffsetCatalog;
use crate::error::Result;

/// Load a catalog from a JSON file.
///
/// Deserialization runs the same completeness checks as the builder, so an
/// incomplete file is rejected here rather than at lookup time.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<OffsetCatalog> {
    let content = fs::read_to_string(&path)?;
    let catalog: OffsetCatalog = serde_json::from_str(&content)?;
    info!(
        "Loaded offset catalog {} from {}",
        catalog.key(),
        path.as_ref().display()
    );
    Ok(catalog)
}

pub fn save_catalog<P: AsRef<Path>>(path: P, catalog: &OffsetCatalog) -> Result<()> {
    let content = serde_json::to_string_pretty(catalog)?;
    fs::write(path, content)?;
    Ok(())
}
