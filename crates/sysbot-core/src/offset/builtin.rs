//! Builtin offset catalogs.
//!
//! Each function produces the catalog for exactly one pinned game version.
//! Supporting a new game update means adding a new function here and listing
//! it in [`builtin_catalogs`]; existing catalogs are never edited in place.

use super::catalog::{BaseName, ChainName, GameFamily, OffsetCatalog, PointerChain, ShiftName};
use crate::error::Result;

/// Sword/Shield 1.3.2
pub const SWSH_VERSION: &str = "1.3.2";
/// Brilliant Diamond/Shining Pearl 1.3.0
pub const BDSP_VERSION: &str = "1.3.0";
/// Legends: Arceus 1.1.1
pub const LA_VERSION: &str = "1.1.1";
/// Scarlet/Violet 3.0.1
pub const SV_VERSION: &str = "3.0.1";

/// All catalogs shipped with the crate
pub fn builtin_catalogs() -> Result<Vec<OffsetCatalog>> {
    Ok(vec![
        sword_shield()?,
        brilliant_diamond()?,
        legends_arceus()?,
        scarlet_violet()?,
    ])
}

fn sword_shield() -> Result<OffsetCatalog> {
    // Heap-resident structures at fixed addresses; chains of length one
    // resolve to base + offset without any pointer read.
    OffsetCatalog::builder(GameFamily::SwordShield, SWSH_VERSION)
        .trainer_block_size(0x110)
        .base(BaseName::TrainerData, 0x4506_8F18)
        .base(BaseName::BoxStart, 0x4507_5880)
        .base(BaseName::LinkTradePartnerPokemon, 0x2E32_206A)
        .base(BaseName::LinkTradePartnerName, 0xAF28_384C)
        .base(BaseName::IsConnected, 0x30C7_CCA8)
        .base(BaseName::CurrentScreen, 0x6B30_FA00)
        .base(BaseName::TextSpeed, 0x4506_90A0)
        .chain(
            ChainName::MyStatus,
            PointerChain::from_base(BaseName::TrainerData, &[0x0]),
        )
        .chain(
            ChainName::BoxStart,
            PointerChain::from_base(BaseName::BoxStart, &[0x0]),
        )
        .chain(
            ChainName::LinkTradePartnerPokemon,
            PointerChain::from_base(BaseName::LinkTradePartnerPokemon, &[0x0]),
        )
        .chain(
            ChainName::LinkTradePartnerName,
            PointerChain::from_base(BaseName::LinkTradePartnerName, &[0x0]),
        )
        .chain(
            ChainName::IsConnected,
            PointerChain::from_base(BaseName::IsConnected, &[0x0]),
        )
        .chain(
            ChainName::LinkTradePartnerNid,
            PointerChain::main(&[0x2660_E9C0, 0x10, 0x68, 0x58]),
        )
        .shift(ShiftName::TextSpeed, 0x7)
        .shift(ShiftName::TradePartnerNid, 0x0)
        .build()
}

fn brilliant_diamond() -> Result<OffsetCatalog> {
    OffsetCatalog::builder(GameFamily::BrilliantDiamond, BDSP_VERSION)
        .trainer_block_size(0x50)
        .chain(
            ChainName::MyStatus,
            PointerChain::main(&[0x4C6_4DC0, 0xB8, 0x10, 0x1E8, 0x0]),
        )
        .chain(
            ChainName::BoxStart,
            PointerChain::main(&[0x4C6_4DC0, 0xB8, 0x10, 0xA0, 0x20, 0x20, 0x20]),
        )
        .chain(
            ChainName::LinkTradePartnerPokemon,
            PointerChain::main(&[0x4C5_9C98, 0xB8, 0x8, 0x20]),
        )
        .chain(
            ChainName::LinkTradePartnerName,
            PointerChain::main(&[0x4C5_9C98, 0xB8, 0x30, 0x10, 0x14]),
        )
        .chain(
            ChainName::LinkTradePartnerNid,
            PointerChain::main(&[0x4C5_9C98, 0xB8, 0x30, 0x40]),
        )
        .chain(
            ChainName::UnionWork,
            PointerChain::main(&[0x4C5_A5A0, 0xB8, 0x8, 0x0]),
        )
        .chain(
            ChainName::Config,
            PointerChain::main(&[0x4C6_4DC0, 0xB8, 0x10, 0x2A8, 0x0]),
        )
        .shift(ShiftName::UnionGaming, 0x3C)
        .shift(ShiftName::UnionTalking, 0x3D)
        .shift(ShiftName::TextSpeed, 0x0)
        .build()
}

fn legends_arceus() -> Result<OffsetCatalog> {
    OffsetCatalog::builder(GameFamily::LegendsArceus, LA_VERSION)
        .trainer_block_size(0x80)
        .chain(
            ChainName::MyStatus,
            PointerChain::main(&[0x42B_A6B0, 0x218, 0x68]),
        )
        .chain(
            ChainName::BoxStart,
            PointerChain::main(&[0x42B_A6B0, 0x1F0, 0x68]),
        )
        .chain(
            ChainName::Overworld,
            PointerChain::main(&[0x42C_30E8, 0x1A9]),
        )
        .chain(
            ChainName::Config,
            PointerChain::main(&[0x42B_A6B0, 0x1E0, 0x68]),
        )
        .shift(ShiftName::TextSpeed, 0x0)
        .build()
}

fn scarlet_violet() -> Result<OffsetCatalog> {
    OffsetCatalog::builder(GameFamily::ScarletViolet, SV_VERSION)
        .trainer_block_size(0x68)
        .chain(
            ChainName::MyStatus,
            PointerChain::main(&[0x473_50D8, 0xD8, 0x8, 0xB8, 0x0, 0x40]),
        )
        .chain(
            ChainName::BoxStart,
            PointerChain::main(&[0x473_50D8, 0xD8, 0x8, 0xB8, 0x30, 0x9D0, 0x0]),
        )
        .chain(
            ChainName::LinkTradePartnerPokemon,
            PointerChain::main(&[0x473_A110, 0x48, 0xE0, 0x0]),
        )
        .chain(
            ChainName::LinkTradePartnerName,
            PointerChain::main(&[0x47A_2B68, 0xC8, 0x88]),
        )
        .chain(
            ChainName::LinkTradePartnerNid,
            PointerChain::main(&[0x475_EA28, 0xF8, 0x8]),
        )
        .chain(
            ChainName::TradePartnerStatus,
            PointerChain::main(&[0x473_A110, 0x48, 0xB0, 0x0]),
        )
        .chain(
            ChainName::IsConnected,
            PointerChain::main(&[0x473_9A60, 0x30]),
        )
        .chain(
            ChainName::Overworld,
            PointerChain::main(&[0x473_ADE0, 0x160, 0xE8, 0x28]),
        )
        .chain(
            ChainName::Config,
            PointerChain::main(&[0x473_50D8, 0xD8, 0x8, 0xB8, 0xD0, 0x40]),
        )
        .chain(
            ChainName::CurrentBox,
            PointerChain::main(&[0x473_50D8, 0xD8, 0x8, 0xB8, 0x28, 0x570]),
        )
        .chain(
            ChainName::PortalBoxStatus,
            PointerChain::main(&[0x475_F378, 0x190, 0x20, 0x178, 0xC8, 0x10]),
        )
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalogs_validate() {
        let catalogs = builtin_catalogs().unwrap();
        assert_eq!(catalogs.len(), 4);
    }

    #[test]
    fn test_builtin_keys_unique() {
        let catalogs = builtin_catalogs().unwrap();
        let keys: HashSet<_> = catalogs.iter().map(|c| c.key()).collect();
        assert_eq!(keys.len(), catalogs.len());
    }

    #[test]
    fn test_sv_my_status_chain() {
        let catalog = scarlet_violet().unwrap();
        let chain = catalog.chain(ChainName::MyStatus).unwrap();
        assert_eq!(chain.offsets, vec![0x47350D8, 0xD8, 0x8, 0xB8, 0x0, 0x40]);
        assert_eq!(chain.dereference_count(), 5);
    }

    #[test]
    fn test_swsh_trainer_data_is_fixed_address() {
        let catalog = sword_shield().unwrap();
        let chain = catalog.chain(ChainName::MyStatus).unwrap();
        assert_eq!(chain.dereference_count(), 0);
        assert_eq!(catalog.base(BaseName::TrainerData).unwrap(), 0x45068F18);
    }

    #[test]
    fn test_bdsp_union_shifts() {
        let catalog = brilliant_diamond().unwrap();
        assert_eq!(catalog.shift(ShiftName::UnionGaming).unwrap(), 0x3C);
        assert_eq!(catalog.shift(ShiftName::UnionTalking).unwrap(), 0x3D);
    }
}
