//! Replay an identity bootstrap against a recorded memory snapshot.
//!
//! A snapshot is a JSON file describing the pointer table and byte regions a
//! target exposed at capture time:
//!
//! ```json
//! {
//!   "name": "192.168.0.106",
//!   "family": "SV",
//!   "main_base": "0x8000000000",
//!   "pointers": { "0x80047350D8": "0x10000" },
//!   "regions": [{ "address": "0x10440", "bytes": "00 D8 0E 00 32 00 00 02" }]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sysbot_core::{
    ApiResponse, BotSession, CatalogRegistry, Error, GameFamily, LogBook, MockConnection,
    ParsedTrainer, RetryStrategy, ShutdownSignal, SwitchConnection,
};
use tracing::{info, warn};

use super::{catalog, parse_family, parse_hex_address, parse_hex_bytes};

/// Gen 8+ trainer ids are displayed as the low six decimal digits
const DISPLAY_ID_MODULUS: u32 = 1_000_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub name: String,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    pub main_base: String,
    #[serde(default)]
    pub pointers: BTreeMap<String, String>,
    #[serde(default)]
    pub regions: Vec<SnapshotRegion>,
    #[serde(default)]
    pub layout: BlockLayout,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotRegion {
    pub address: String,
    pub bytes: String,
}

/// Field positions inside the trainer block.
///
/// Defaults follow the Scarlet/Violet status block: 32-bit id at 0x00, game
/// at 0x04, language at 0x07 and a UTF-16LE name at 0x10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlockLayout {
    pub trainer_id: usize,
    pub game_version: usize,
    pub language: usize,
    pub name: usize,
    pub name_chars: usize,
}

impl Default for BlockLayout {
    fn default() -> Self {
        Self {
            trainer_id: 0x00,
            game_version: 0x04,
            language: 0x07,
            name: 0x10,
            name_chars: 12,
        }
    }
}

impl BlockLayout {
    pub fn parse(&self, bytes: &[u8]) -> sysbot_core::Result<ParsedTrainer> {
        let byte_at = |offset: usize| {
            bytes
                .get(offset)
                .copied()
                .ok_or_else(|| Error::SaveParse(format!("block too short for offset {offset:#x}")))
        };

        let id = self
            .trainer_id
            .checked_add(4)
            .and_then(|end| bytes.get(self.trainer_id..end))
            .ok_or_else(|| Error::SaveParse("block too short for trainer id".to_string()))?;
        let id = u32::from_le_bytes([id[0], id[1], id[2], id[3]]);

        let name = self
            .name_chars
            .checked_mul(2)
            .and_then(|len| self.name.checked_add(len))
            .and_then(|end| bytes.get(self.name..end))
            .ok_or_else(|| Error::SaveParse("block too short for trainer name".to_string()))?;
        let units = name
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .take_while(|unit| *unit != 0);
        let trainer_name = char::decode_utf16(units)
            .collect::<Result<String, _>>()
            .map_err(|e| Error::SaveParse(format!("invalid trainer name: {e}")))?;

        Ok(ParsedTrainer {
            language: byte_at(self.language)?,
            game_version: byte_at(self.game_version)?,
            trainer_name,
            display_id: id % DISPLAY_ID_MODULUS,
        })
    }
}

impl Snapshot {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }

    /// Scripted connection serving the recorded memory
    pub fn connection(&self) -> Result<MockConnection> {
        let mut builder = MockConnection::builder()
            .name(&self.name)
            .main_base(parse_hex_address(&self.main_base)?);

        for (address, value) in &self.pointers {
            builder = builder.pointer(parse_hex_address(address)?, parse_hex_address(value)?);
        }
        for region in &self.regions {
            builder = builder.region(
                parse_hex_address(&region.address)?,
                parse_hex_bytes(&region.bytes)?,
            );
        }
        Ok(builder.build())
    }
}

/// Outcome of a replayed bootstrap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub catalog: String,
    pub label: Option<String>,
    pub language: Option<String>,
    pub reads: usize,
    pub log: Vec<String>,
}

/// Replay `snapshot` and report what the session saw
pub fn replay(
    snapshot: &Snapshot,
    registry: &CatalogRegistry,
    family: Option<GameFamily>,
    version: Option<&str>,
    strategy: &dyn RetryStrategy,
    shutdown: Arc<ShutdownSignal>,
    book: Arc<LogBook>,
) -> Result<ApiResponse<ReplayReport>> {
    let family = match family {
        Some(family) => family,
        None => parse_family(snapshot.family.as_deref().unwrap_or("SV"))?,
    };
    let version = version.or(snapshot.version.as_deref());
    let catalog = catalog::select(registry, family, version)?;
    let connection = snapshot.connection()?;
    info!(
        "Replaying snapshot of {} against catalog {}",
        connection.name(),
        catalog.key()
    );

    let layout = snapshot.layout;
    let parser = move |bytes: &[u8]| layout.parse(bytes);
    let mut session =
        BotSession::new(connection, catalog, Arc::clone(&book)).with_shutdown(shutdown);

    let outcome = session
        .identify_with_retry(&parser, strategy)
        .map(|identity| (identity.label(), identity.language().to_string()));

    let active = session.log().active_id();
    let mut report = ReplayReport {
        catalog: catalog.key(),
        reads: session.connection().reads().len(),
        log: book
            .entries(&active)
            .iter()
            .map(|entry| format!("[{}] {}", entry.level, entry.message))
            .collect(),
        ..ReplayReport::default()
    };

    let response = match outcome {
        Ok((label, language)) => {
            report.label = Some(label);
            report.language = Some(language);
            ApiResponse::success(report)
        }
        Err(e) => {
            warn!("Replay did not identify a trainer: {}", e);
            ApiResponse::failure(e.to_string(), report)
        }
    };
    Ok(response.stamped())
}

/// Run the replay command
pub fn run(
    path: &Path,
    registry: &CatalogRegistry,
    family: Option<GameFamily>,
    version: Option<&str>,
    strategy: &dyn RetryStrategy,
    shutdown: Arc<ShutdownSignal>,
    book: Arc<LogBook>,
) -> Result<()> {
    let snapshot = Snapshot::load(path)?;
    let response = replay(&snapshot, registry, family, version, strategy, shutdown, book)?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if let Some(message) = response.error_message() {
        anyhow::bail!("Replay failed: {}", message);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysbot_core::NoRetry;

    /// SV status block for "Ash", id 1_483_256 (displayed 483256), English
    fn sv_block() -> String {
        let mut block = vec![0u8; 0x68];
        block[0..4].copy_from_slice(&1_483_256u32.to_le_bytes());
        block[0x04] = 50;
        block[0x07] = 2;
        for (i, unit) in "Ash".encode_utf16().enumerate() {
            block[0x10 + i * 2..0x12 + i * 2].copy_from_slice(&unit.to_le_bytes());
        }
        block
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn sv_snapshot(last_hop: &str) -> Snapshot {
        let json = serde_json::json!({
            "name": "192.168.0.106",
            "family": "SV",
            "main_base": "0x8000000000",
            "pointers": {
                "0x80047350D8": "0x10000",
                "0x100D8": "0x10100",
                "0x10108": "0x10200",
                "0x102B8": last_hop,
                "0x10300": "0x10400"
            },
            "regions": [{ "address": "0x10440", "bytes": sv_block() }]
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_layout_parses_sv_block() {
        let bytes = parse_hex_bytes(&sv_block()).unwrap();
        let parsed = BlockLayout::default().parse(&bytes).unwrap();
        assert_eq!(parsed.trainer_name, "Ash");
        assert_eq!(parsed.display_id, 483256);
        assert_eq!(parsed.language, 2);
        assert_eq!(parsed.game_version, 50);
    }

    #[test]
    fn test_layout_rejects_short_block() {
        let err = BlockLayout::default().parse(&[0u8; 8]).unwrap_err();
        assert!(matches!(err, Error::SaveParse(_)));
    }

    #[test]
    fn test_layout_rejects_overflowing_offsets() {
        let block = [0u8; 0x68];
        let layouts = [
            BlockLayout {
                trainer_id: usize::MAX,
                ..BlockLayout::default()
            },
            BlockLayout {
                name: usize::MAX,
                ..BlockLayout::default()
            },
            BlockLayout {
                name_chars: usize::MAX,
                ..BlockLayout::default()
            },
        ];
        for layout in layouts {
            let err = layout.parse(&block).unwrap_err();
            assert!(matches!(err, Error::SaveParse(_)), "{layout:?}");
        }
    }

    #[test]
    fn test_replay_identifies_trainer() {
        let registry = CatalogRegistry::builtin().unwrap();
        let snapshot = sv_snapshot("0x10300");

        let response = replay(
            &snapshot,
            &registry,
            None,
            None,
            &NoRetry,
            Arc::new(ShutdownSignal::new()),
            Arc::new(LogBook::new()),
        )
        .unwrap();

        assert!(response.is_success());
        assert!(response.timestamp().is_some());
        let report = response.payload();
        assert_eq!(report.catalog, "SV-3.0.1");
        assert_eq!(report.label.as_deref(), Some("Ash-483256"));
        assert_eq!(report.language.as_deref(), Some("ENG"));
        // five pointer hops plus the block read
        assert_eq!(report.reads, 6);
        assert_eq!(report.log.len(), 1);
    }

    #[test]
    fn test_replay_reports_absent_structure() {
        let registry = CatalogRegistry::builtin().unwrap();
        let snapshot = sv_snapshot("0x0");

        let response = replay(
            &snapshot,
            &registry,
            None,
            None,
            &NoRetry,
            Arc::new(ShutdownSignal::new()),
            Arc::new(LogBook::new()),
        )
        .unwrap();

        assert!(!response.is_success());
        assert!(response.error_message().unwrap().contains("Null pointer"));
        assert!(response.payload().label.is_none());
        assert_eq!(response.payload().reads, 4);
    }

    #[test]
    fn test_snapshot_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{ "name": "usb", "main_base": "0x0", "layout": { "name": 32 } }"#,
        )
        .unwrap();

        let snapshot = Snapshot::load(&path).unwrap();
        assert_eq!(snapshot.layout.name, 32);
        assert_eq!(snapshot.layout.language, 0x07);
        assert_eq!(snapshot.connection().unwrap().name(), "usb");
    }
}
