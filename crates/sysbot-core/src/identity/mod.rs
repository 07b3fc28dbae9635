//! Trainer identity derived from save data.
//!
//! Save bytes are decoded by an external [`SaveParser`]; this module only
//! validates the decoded fields and builds the session label from them.

mod language;

pub use language::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Error, Result};

/// Game version value meaning "not set"
pub const GAME_VERSION_UNSET: u8 = 0;

/// Width of the zero-padded display ID in labels
pub const DISPLAY_ID_WIDTH: usize = 6;

/// Fields decoded from a trainer save block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTrainer {
    pub language: u8,
    pub game_version: u8,
    pub trainer_name: String,
    pub display_id: u32,
}

/// Decodes raw save bytes into trainer fields
pub trait SaveParser {
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrainer>;
}

impl<F> SaveParser for F
where
    F: Fn(&[u8]) -> Result<ParsedTrainer>,
{
    fn parse(&self, bytes: &[u8]) -> Result<ParsedTrainer> {
        self(bytes)
    }
}

/// Why parsed trainer fields were not accepted as an identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityRejection {
    #[error("language {0} is out of range")]
    LanguageOutOfRange(u8),

    #[error("trainer name is empty")]
    EmptyName,

    #[error("game version is unset")]
    VersionUnset,
}

/// Validated trainer identity for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerIdentity {
    language: Language,
    game_version: u8,
    name: String,
    display_id: u32,
}

impl TrainerIdentity {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn game_version(&self) -> u8 {
        self.game_version
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_id(&self) -> u32 {
        self.display_id
    }

    /// Canonical label, e.g. `Ash-000042`
    pub fn label(&self) -> String {
        format_label(&self.name, self.display_id)
    }
}

impl TryFrom<ParsedTrainer> for TrainerIdentity {
    type Error = IdentityRejection;

    fn try_from(parsed: ParsedTrainer) -> std::result::Result<Self, Self::Error> {
        let language = validate(&parsed)?;
        Ok(Self {
            language,
            game_version: parsed.game_version,
            name: parsed.trainer_name,
            display_id: parsed.display_id,
        })
    }
}

pub fn format_label(name: &str, display_id: u32) -> String {
    format!("{}-{:0width$}", name, display_id, width = DISPLAY_ID_WIDTH)
}

/// Check parsed fields, returning the decoded language when usable
pub fn validate(parsed: &ParsedTrainer) -> std::result::Result<Language, IdentityRejection> {
    let language = Language::from_u8(parsed.language)
        .filter(|_| Language::in_range(parsed.language))
        .ok_or(IdentityRejection::LanguageOutOfRange(parsed.language))?;

    if parsed.trainer_name.is_empty() {
        return Err(IdentityRejection::EmptyName);
    }

    if parsed.game_version == GAME_VERSION_UNSET {
        return Err(IdentityRejection::VersionUnset);
    }

    Ok(language)
}

/// Parse `raw` and build a validated identity.
///
/// A rejected identity is reported as [`Error::InvalidIdentity`]; callers
/// must bootstrap again later instead of continuing without one.
pub fn bootstrap<P: SaveParser + ?Sized>(parser: &P, raw: &[u8]) -> Result<TrainerIdentity> {
    let parsed = parser.parse(raw)?;
    TrainerIdentity::try_from(parsed).map_err(Error::InvalidIdentity)
}
