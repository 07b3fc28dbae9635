//! `sysbot.toml` handling.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sysbot_core::{ExponentialBackoff, FixedDelay, NoRetry, RetryStrategy};

/// CLI configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Default game family (`SWSH`, `BDSP`, `LA`, `SV`)
    pub family: Option<String>,
    /// Default game version; the family's builtin version when unset
    pub version: Option<String>,
    /// Extra catalog JSON files registered next to the builtin ones
    pub catalogs: Vec<PathBuf>,
    pub retry: RetryConfig,
}

/// How identification retries are spaced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    None,
    Fixed,
    #[default]
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub mode: RetryMode,
    pub max_retries: u32,
    pub delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            mode: RetryMode::Exponential,
            max_retries: 10,
            delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    pub fn strategy(&self) -> Box<dyn RetryStrategy> {
        let delay = Duration::from_millis(self.delay_ms);
        match self.mode {
            RetryMode::None => Box::new(NoRetry),
            RetryMode::Fixed => Box::new(FixedDelay::new(delay, self.max_retries)),
            RetryMode::Exponential => Box::new(ExponentialBackoff::new(
                delay,
                Duration::from_millis(self.max_delay_ms),
                self.max_retries,
            )),
        }
    }
}

impl CliConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "family = \"SV\"").unwrap();
        writeln!(file, "[retry]").unwrap();
        writeln!(file, "mode = \"fixed\"").unwrap();
        writeln!(file, "max_retries = 3").unwrap();

        let config = CliConfig::load(file.path()).unwrap();
        assert_eq!(config.family.as_deref(), Some("SV"));
        assert!(config.version.is_none());
        assert!(config.catalogs.is_empty());
        assert_eq!(config.retry.mode, RetryMode::Fixed);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.delay_ms, 500);
    }

    #[test]
    fn test_save_and_load() {
        let file = NamedTempFile::new().unwrap();
        let config = CliConfig {
            family: Some("BDSP".to_string()),
            version: Some("1.3.0".to_string()),
            catalogs: vec![PathBuf::from("catalogs/bdsp-1.3.1.json")],
            retry: RetryConfig {
                mode: RetryMode::None,
                ..RetryConfig::default()
            },
        };

        config.save(file.path()).unwrap();
        assert_eq!(CliConfig::load(file.path()).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::load(dir.path().join("sysbot.toml")).is_err());
    }

    #[test]
    fn test_retry_strategies() {
        let mut retry = RetryConfig {
            mode: RetryMode::Fixed,
            max_retries: 2,
            delay_ms: 100,
            max_delay_ms: 1_000,
        };
        let strategy = retry.strategy();
        assert_eq!(strategy.next_delay(1), Some(Duration::from_millis(100)));
        assert_eq!(strategy.next_delay(3), None);

        retry.mode = RetryMode::None;
        assert_eq!(retry.strategy().next_delay(1), None);
    }
}
