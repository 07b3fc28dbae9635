//! CLI command implementations.

pub mod catalog;
pub mod label;
pub mod replay;

use anyhow::{Result, anyhow, bail};
use sysbot_core::GameFamily;

/// Parse a hex address string (with or without 0x prefix)
pub fn parse_hex_address(s: &str) -> Result<u64> {
    let s = s.trim().trim_start_matches("0x").trim_start_matches("0X");
    let s = s.replace('_', "");
    u64::from_str_radix(&s, 16).map_err(|e| anyhow!("Invalid hex address: {}", e))
}

/// Parse space-separated hex bytes (`"02 32 A8 5F"`)
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>> {
    s.split_whitespace()
        .map(|part| {
            u8::from_str_radix(part, 16).map_err(|e| anyhow!("Invalid hex byte {:?}: {}", part, e))
        })
        .collect()
}

/// Parse a family short name (`SWSH`, `BDSP`, `LA`, `SV`), case-insensitive
pub fn parse_family(s: &str) -> Result<GameFamily> {
    match s.to_ascii_uppercase().parse() {
        Ok(family) => Ok(family),
        Err(_) => bail!("Unknown game family: {} (expected SWSH, BDSP, LA or SV)", s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_address() {
        assert_eq!(parse_hex_address("0x473_50D8").unwrap(), 0x47350D8);
        assert_eq!(parse_hex_address("45068F18").unwrap(), 0x45068F18);
        assert!(parse_hex_address("0xZZ").is_err());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("02 32  a8 5F").unwrap(), vec![0x02, 0x32, 0xA8, 0x5F]);
        assert!(parse_hex_bytes("").unwrap().is_empty());
        assert!(parse_hex_bytes("123").is_err());
    }

    #[test]
    fn test_parse_family() {
        assert_eq!(parse_family("sv").unwrap(), GameFamily::ScarletViolet);
        assert_eq!(parse_family("BDSP").unwrap(), GameFamily::BrilliantDiamond);
        assert!(parse_family("ORAS").is_err());
    }
}
