use crate::offset::{ChainBase, OffsetCatalog};
use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Human-readable catalog dump for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct CatalogDump {
    pub key: String,
    pub family: String,
    pub version: String,
    pub trainer_block_size: String,
    pub bases: Vec<NamedValue>,
    pub chains: Vec<ChainDump>,
    pub shifts: Vec<NamedValue>,
}

/// A named constant in hex string format
#[derive(Debug, Clone, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: String,
}

/// A pointer chain rendered as `[main+0x47350D8] -> +0xD8 -> ...`
#[derive(Debug, Clone, Serialize)]
pub struct ChainDump {
    pub name: String,
    pub base: String,
    pub offsets: Vec<String>,
    pub dereferences: usize,
}

impl CatalogDump {
    pub fn from_catalog(catalog: &OffsetCatalog) -> Self {
        let bases = catalog
            .bases()
            .map(|(name, value)| NamedValue {
                name: name.to_string(),
                value: format!("0x{:X}", value),
            })
            .collect();

        let chains = catalog
            .chains()
            .map(|(name, chain)| ChainDump {
                name: name.to_string(),
                base: match chain.base {
                    ChainBase::Main => "main".to_string(),
                    ChainBase::Base(base) => base.to_string(),
                    ChainBase::Absolute(address) => format!("0x{:X}", address),
                },
                offsets: chain.offsets.iter().map(|o| format_signed_hex(*o)).collect(),
                dereferences: chain.dereference_count(),
            })
            .collect();

        let shifts = catalog
            .shifts()
            .map(|(name, value)| NamedValue {
                name: name.to_string(),
                value: format!("0x{:X}", value),
            })
            .collect();

        Self {
            key: catalog.key(),
            family: catalog.family().to_string(),
            version: catalog.version().to_string(),
            trainer_block_size: format!("0x{:X}", catalog.trainer_block_size()),
            bases,
            chains,
            shifts,
        }
    }

    /// Save dump to JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn format_signed_hex(value: i64) -> String {
    if value < 0 {
        format!("-0x{:X}", value.unsigned_abs())
    } else {
        format!("0x{:X}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::{GameFamily, SV_VERSION, CatalogRegistry};

    #[test]
    fn test_format_signed_hex() {
        assert_eq!(format_signed_hex(0x40), "0x40");
        assert_eq!(format_signed_hex(-0x10), "-0x10");
        assert_eq!(format_signed_hex(0), "0x0");
    }

    #[test]
    fn test_dump_sv_catalog() {
        let registry = CatalogRegistry::builtin().unwrap();
        let catalog = registry.get(GameFamily::ScarletViolet, SV_VERSION).unwrap();
        let dump = CatalogDump::from_catalog(catalog);

        assert_eq!(dump.key, "SV-3.0.1");
        assert_eq!(dump.trainer_block_size, "0x68");
        let my_status = dump.chains.iter().find(|c| c.name == "MyStatus").unwrap();
        assert_eq!(my_status.base, "main");
        assert_eq!(my_status.offsets[0], "0x47350D8");
        assert_eq!(my_status.dereferences, 5);
    }

    #[test]
    fn test_dump_save() {
        let registry = CatalogRegistry::builtin().unwrap();
        let catalog = registry.get(GameFamily::ScarletViolet, SV_VERSION).unwrap();
        let temp_file = tempfile::NamedTempFile::new().unwrap();

        CatalogDump::from_catalog(catalog).save(temp_file.path()).unwrap();
        let content = fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("\"key\": \"SV-3.0.1\""));
    }
}
