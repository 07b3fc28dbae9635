use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::{Error, Result};

/// Supported game families
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
pub enum GameFamily {
    #[strum(serialize = "SWSH")]
    SwordShield,
    #[strum(serialize = "BDSP")]
    BrilliantDiamond,
    #[strum(serialize = "LA")]
    LegendsArceus,
    #[strum(serialize = "SV")]
    ScarletViolet,
}

impl GameFamily {
    pub fn short_name(&self) -> &'static str {
        self.into()
    }

    /// Chains every catalog of this family must carry
    pub fn required_chains(&self) -> &'static [ChainName] {
        use ChainName::*;
        match self {
            Self::SwordShield | Self::ScarletViolet => &[
                MyStatus,
                BoxStart,
                LinkTradePartnerPokemon,
                LinkTradePartnerName,
                IsConnected,
            ],
            Self::BrilliantDiamond => &[
                MyStatus,
                BoxStart,
                LinkTradePartnerPokemon,
                LinkTradePartnerName,
                UnionWork,
            ],
            Self::LegendsArceus => &[MyStatus, BoxStart, Overworld],
        }
    }

    /// Byte shifts every catalog of this family must carry
    pub fn required_shifts(&self) -> &'static [ShiftName] {
        match self {
            Self::BrilliantDiamond => &[ShiftName::UnionGaming, ShiftName::UnionTalking],
            _ => &[],
        }
    }
}

/// Named scalar base addresses
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
pub enum BaseName {
    TrainerData,
    BoxStart,
    LinkTradePartnerPokemon,
    LinkTradePartnerName,
    IsConnected,
    CurrentScreen,
    TextSpeed,
}

/// Named pointer chains
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
pub enum ChainName {
    /// Save-data block holding the trainer's status (name, IDs, language)
    MyStatus,
    BoxStart,
    LinkTradePartnerPokemon,
    LinkTradePartnerName,
    LinkTradePartnerNid,
    TradePartnerStatus,
    IsConnected,
    Overworld,
    Config,
    CurrentBox,
    PortalBoxStatus,
    UnionWork,
}

/// Named fixed byte shifts, applied to an already resolved address
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
pub enum ShiftName {
    TextSpeed,
    UnionGaming,
    UnionTalking,
    TradePartnerNid,
}

/// Where a pointer chain starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainBase {
    /// Load address of the main executable, reported by the connection
    Main,
    /// A named base address of the same catalog
    Base(BaseName),
    /// A fixed absolute address
    Absolute(u64),
}

/// Ordered signed offsets walked from a starting base.
///
/// Every offset but the last is followed by a pointer read; the last one is
/// only added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerChain {
    pub base: ChainBase,
    pub offsets: Vec<i64>,
}

impl PointerChain {
    pub fn main(offsets: &[i64]) -> Self {
        Self {
            base: ChainBase::Main,
            offsets: offsets.to_vec(),
        }
    }

    pub fn from_base(base: BaseName, offsets: &[i64]) -> Self {
        Self {
            base: ChainBase::Base(base),
            offsets: offsets.to_vec(),
        }
    }

    /// Number of pointer reads needed to resolve this chain
    pub fn dereference_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

/// Per-version table of base addresses, pointer chains and byte shifts.
///
/// Only constructible through [`OffsetCatalogBuilder::build`] (or
/// deserialization, which goes through the same validation), so a catalog
/// that exists is complete for its family. There are no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogData", into = "CatalogData")]
pub struct OffsetCatalog {
    family: GameFamily,
    version: String,
    trainer_block_size: usize,
    bases: BTreeMap<BaseName, u64>,
    chains: BTreeMap<ChainName, PointerChain>,
    shifts: BTreeMap<ShiftName, u32>,
}

impl OffsetCatalog {
    pub fn builder<S: Into<String>>(family: GameFamily, version: S) -> OffsetCatalogBuilder {
        OffsetCatalogBuilder {
            data: CatalogData {
                family,
                version: version.into(),
                trainer_block_size: 0,
                bases: BTreeMap::new(),
                chains: BTreeMap::new(),
                shifts: BTreeMap::new(),
            },
        }
    }

    pub fn family(&self) -> GameFamily {
        self.family
    }

    /// Exact game version string this catalog is pinned to
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Catalog key, e.g. `SV-3.0.1`
    pub fn key(&self) -> String {
        catalog_key(self.family, &self.version)
    }

    /// Bytes to read at the resolved `MyStatus` address
    pub fn trainer_block_size(&self) -> usize {
        self.trainer_block_size
    }

    pub fn base(&self, name: BaseName) -> Result<u64> {
        self.bases
            .get(&name)
            .copied()
            .ok_or_else(|| self.missing(name.into()))
    }

    pub fn chain(&self, name: ChainName) -> Result<&PointerChain> {
        self.chains.get(&name).ok_or_else(|| self.missing(name.into()))
    }

    pub fn shift(&self, name: ShiftName) -> Result<u32> {
        self.shifts
            .get(&name)
            .copied()
            .ok_or_else(|| self.missing(name.into()))
    }

    pub fn has_chain(&self, name: ChainName) -> bool {
        self.chains.contains_key(&name)
    }

    pub fn bases(&self) -> impl Iterator<Item = (BaseName, u64)> + '_ {
        self.bases.iter().map(|(k, v)| (*k, *v))
    }

    pub fn chains(&self) -> impl Iterator<Item = (ChainName, &PointerChain)> {
        self.chains.iter().map(|(k, v)| (*k, v))
    }

    pub fn shifts(&self) -> impl Iterator<Item = (ShiftName, u32)> + '_ {
        self.shifts.iter().map(|(k, v)| (*k, *v))
    }

    fn missing(&self, name: &'static str) -> Error {
        Error::MissingOffset {
            version: self.key(),
            name: name.to_string(),
        }
    }
}

pub(crate) fn catalog_key(family: GameFamily, version: &str) -> String {
    format!("{}-{}", family.short_name(), version)
}

/// Builder for [`OffsetCatalog`]
#[derive(Debug, Clone)]
pub struct OffsetCatalogBuilder {
    data: CatalogData,
}

impl OffsetCatalogBuilder {
    pub fn trainer_block_size(mut self, size: usize) -> Self {
        self.data.trainer_block_size = size;
        self
    }

    pub fn base(mut self, name: BaseName, address: u64) -> Self {
        self.data.bases.insert(name, address);
        self
    }

    pub fn chain(mut self, name: ChainName, chain: PointerChain) -> Self {
        self.data.chains.insert(name, chain);
        self
    }

    pub fn shift(mut self, name: ShiftName, shift: u32) -> Self {
        self.data.shifts.insert(name, shift);
        self
    }

    /// Validate completeness and produce the catalog
    pub fn build(self) -> Result<OffsetCatalog> {
        OffsetCatalog::try_from(self.data)
    }
}

/// Serialized form of a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub family: GameFamily,
    pub version: String,
    pub trainer_block_size: usize,
    #[serde(default)]
    pub bases: BTreeMap<BaseName, u64>,
    #[serde(default)]
    pub chains: BTreeMap<ChainName, PointerChain>,
    #[serde(default)]
    pub shifts: BTreeMap<ShiftName, u32>,
}

impl TryFrom<CatalogData> for OffsetCatalog {
    type Error = Error;

    fn try_from(data: CatalogData) -> Result<Self> {
        let key = catalog_key(data.family, &data.version);

        if data.version.trim().is_empty() {
            return Err(Error::InvalidCatalog(format!(
                "{} has an empty version string",
                data.family
            )));
        }

        if data.trainer_block_size == 0 {
            return Err(Error::InvalidCatalog(format!(
                "{key}: trainer block size is zero"
            )));
        }

        for (name, chain) in &data.chains {
            if chain.offsets.is_empty() {
                return Err(Error::InvalidCatalog(format!("{key}: chain {name} is empty")));
            }
            if let ChainBase::Base(base) = chain.base {
                if !data.bases.contains_key(&base) {
                    return Err(Error::InvalidCatalog(format!(
                        "{key}: chain {name} starts at missing base {base}"
                    )));
                }
            }
        }

        for name in data.family.required_chains() {
            if !data.chains.contains_key(name) {
                return Err(Error::InvalidCatalog(format!(
                    "{key}: required chain {name} missing"
                )));
            }
        }

        for name in data.family.required_shifts() {
            if !data.shifts.contains_key(name) {
                return Err(Error::InvalidCatalog(format!(
                    "{key}: required shift {name} missing"
                )));
            }
        }

        Ok(Self {
            family: data.family,
            version: data.version,
            trainer_block_size: data.trainer_block_size,
            bases: data.bases,
            chains: data.chains,
            shifts: data.shifts,
        })
    }
}

impl From<OffsetCatalog> for CatalogData {
    fn from(catalog: OffsetCatalog) -> Self {
        Self {
            family: catalog.family,
            version: catalog.version,
            trainer_block_size: catalog.trainer_block_size,
            bases: catalog.bases,
            chains: catalog.chains,
            shifts: catalog.shifts,
        }
    }
}
