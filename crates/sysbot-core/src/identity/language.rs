use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, FromRepr, IntoStaticStr};

/// Raw value meaning "language not set"
pub const LANGUAGE_UNSET: u8 = 0;
/// Lowest valid language code (exclusive bound is [`LANGUAGE_UNSET`])
pub const LANGUAGE_MIN: u8 = Language::Japanese as u8;
/// Highest valid language code, inclusive
pub const LANGUAGE_MAX: u8 = Language::ChineseTraditional as u8;

/// Save-data language codes a trainer identity may carry.
///
/// Code 6 is never assigned to a real language but is still a valid value
/// inside the range, so it is a member.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    FromRepr,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
pub enum Language {
    #[strum(serialize = "JPN")]
    Japanese = 1,
    #[strum(serialize = "ENG")]
    English = 2,
    #[strum(serialize = "FRE")]
    French = 3,
    #[strum(serialize = "ITA")]
    Italian = 4,
    #[strum(serialize = "GER")]
    German = 5,
    #[strum(serialize = "UNK")]
    Unused6 = 6,
    #[strum(serialize = "SPA")]
    Spanish = 7,
    #[strum(serialize = "KOR")]
    Korean = 8,
    #[strum(serialize = "CHS")]
    ChineseSimplified = 9,
    #[strum(serialize = "CHT")]
    ChineseTraditional = 10,
}

impl Language {
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::from_repr(value)
    }

    /// Whether `value` lies in `(LANGUAGE_UNSET, LANGUAGE_MAX]`
    pub fn in_range(value: u8) -> bool {
        value > LANGUAGE_UNSET && value <= LANGUAGE_MAX
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}
