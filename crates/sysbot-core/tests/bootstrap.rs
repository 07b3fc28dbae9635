use std::sync::Arc;
use std::thread;

use sysbot_core::logbook::{self, LogBook};
use sysbot_core::offset::{self, BDSP_VERSION, SV_VERSION};
use sysbot_core::{
    BotSession, CatalogRegistry, ChainName, Error, GameFamily, MockConnection, ParsedTrainer,
    Result, ShiftName,
};

const MAIN: u64 = 0x80_0000_0000;

/// [language, version, display id (u32 LE), name bytes...]
fn parse_block(bytes: &[u8]) -> Result<ParsedTrainer> {
    if bytes.len() < 6 {
        return Err(Error::SaveParse("block too short".to_string()));
    }
    let name = bytes[6..]
        .iter()
        .take_while(|b| **b != 0)
        .map(|b| *b as char)
        .collect();
    Ok(ParsedTrainer {
        language: bytes[0],
        game_version: bytes[1],
        trainer_name: name,
        display_id: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
    })
}

fn block(language: u8, id: u32, name: &str) -> Vec<u8> {
    let mut data = vec![0u8; 0x68];
    data[0] = language;
    data[1] = 50;
    data[2..6].copy_from_slice(&id.to_le_bytes());
    data[6..6 + name.len()].copy_from_slice(name.as_bytes());
    data
}

/// Scarlet/Violet target whose MyStatus chain lands at `heap + 0x40`
fn sv_target(name: &str, heap: u64, trainer: Vec<u8>) -> MockConnection {
    MockConnection::builder()
        .name(name)
        .main_base(MAIN)
        .pointer(MAIN + 0x473_50D8, heap)
        .pointer(heap + 0xD8, heap + 0x100)
        .pointer(heap + 0x108, heap + 0x200)
        .pointer(heap + 0x2B8, heap + 0x300)
        .pointer(heap + 0x300, heap + 0x400)
        .region(heap + 0x440, trainer)
        .build()
}

#[test]
fn test_bootstrap_through_global_log_book() {
    logbook::reset_global();
    let book = logbook::install_global();
    let registry = offset::global().unwrap();
    let catalog = registry.get(GameFamily::ScarletViolet, SV_VERSION).unwrap();

    let conn = sv_target("192.168.0.106", 0x1_0000, block(2, 483256, "Ash"));
    let mut session = BotSession::new(conn, catalog, Arc::clone(&book));
    session.log().info("Connected");
    session.log().info("Detected game version");
    session.log().info("Reading trainer block");

    let label = session.identify(&parse_block).unwrap().label();
    assert_eq!(label, "Ash-483256");

    let global = logbook::global().unwrap();
    assert_eq!(global.count("192.168.0.106"), 0);
    let entries = global.entries("Ash-483256");
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[0].message, "Connected");
    assert_eq!(entries[2].message, "Reading trainer block");
    assert_eq!(entries[3].message, "192.168.0.106 identified as Ash-483256, using ENG.");

    logbook::reset_global();
    assert!(logbook::global().is_none());
}

#[test]
fn test_concurrent_sessions_on_independent_connections() {
    let registry = CatalogRegistry::builtin().unwrap();
    let catalog = registry
        .get(GameFamily::ScarletViolet, SV_VERSION)
        .unwrap()
        .clone();
    let catalog = Arc::new(catalog);
    let book = Arc::new(LogBook::new());

    let handles: Vec<_> = (0..4u32)
        .map(|i| {
            let catalog = Arc::clone(&catalog);
            let book = Arc::clone(&book);
            thread::spawn(move || {
                let name = format!("10.0.0.{i}");
                let heap = 0x10_0000 * u64::from(i + 1);
                let trainer = format!("Bot{i}");
                let conn = sv_target(&name, heap, block(2, i * 11, &trainer));

                let mut session = BotSession::new(conn, &catalog, book);
                for n in 0..10 {
                    session.log().info(format!("pre-identify {n}"));
                }
                session.identify(&parse_block).unwrap().label()
            })
        })
        .collect();

    let labels: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(labels[3], "Bot3-000033");

    for (i, label) in labels.iter().enumerate() {
        assert_eq!(book.count(&format!("10.0.0.{i}")), 0);
        assert_eq!(book.count(label), 11);
    }
}

#[test]
fn test_structure_absent_then_present() {
    let registry = CatalogRegistry::builtin().unwrap();
    let catalog = registry.get(GameFamily::ScarletViolet, SV_VERSION).unwrap();
    let book = Arc::new(LogBook::new());

    let mut conn = sv_target("10.0.1.1", 0x2_0000, block(1, 7, "Red"));
    conn.set_pointer(0x2_0000 + 0x2B8, 0);
    let mut session = BotSession::new(conn, catalog, Arc::clone(&book));

    let err = session.identify(&parse_block).unwrap_err();
    assert!(err.is_structure_absent());
    assert!(!err.is_connectivity());
    // four hops issued: base, +0xD8, +0x8, then the null +0xB8
    assert_eq!(session.connection().reads().len(), 4);

    session
        .connection_mut()
        .set_pointer(0x2_0000 + 0x2B8, 0x2_0000 + 0x300);
    let identity = session.identify(&parse_block).unwrap();
    assert_eq!(identity.label(), "Red-000007");
}

#[test]
fn test_bdsp_union_flags_through_session() {
    let registry = CatalogRegistry::builtin().unwrap();
    let catalog = registry
        .get(GameFamily::BrilliantDiamond, BDSP_VERSION)
        .unwrap();

    let mut union_work = vec![0u8; 0x40];
    union_work[0x3D] = 1;
    let conn = MockConnection::builder()
        .main_base(MAIN)
        .pointer(MAIN + 0x4C5_A5A0, 0x5000)
        .pointer(0x50B8, 0x6000)
        .pointer(0x6008, 0x7000)
        .region(0x7000, union_work)
        .build();

    let mut session = BotSession::new(conn, catalog, Arc::new(LogBook::new()));
    assert_eq!(
        session
            .read_shifted_byte(ChainName::UnionWork, ShiftName::UnionGaming)
            .unwrap(),
        0
    );
    assert_eq!(
        session
            .read_shifted_byte(ChainName::UnionWork, ShiftName::UnionTalking)
            .unwrap(),
        1
    );
}
