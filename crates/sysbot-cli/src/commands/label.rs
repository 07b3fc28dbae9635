//! Label command implementation.

use anyhow::Result;
use sysbot_core::{ParsedTrainer, TrainerIdentity};

/// Validate trainer fields and build the session label
pub fn label(name: &str, display_id: u32, language: u8, game_version: u8) -> Result<String> {
    let identity = TrainerIdentity::try_from(ParsedTrainer {
        language,
        game_version,
        trainer_name: name.to_string(),
        display_id,
    })?;
    Ok(identity.label())
}

/// Run the label command
pub fn run(name: &str, display_id: u32, language: u8, game_version: u8) -> Result<()> {
    println!("{}", label(name, display_id, language, game_version)?);
    Ok(())
}
