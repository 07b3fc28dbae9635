use thiserror::Error;

use crate::identity::IdentityRejection;
use crate::shutdown::TeardownReason;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Connection failed at address {address:#x}: {message}")]
    Connection { address: u64, message: String },

    #[error("Connection timed out at address {address:#x}")]
    Timeout { address: u64 },

    #[error("Null pointer at hop {hop} (address {address:#x}); structure not currently present")]
    NullPointer { hop: usize, address: u64 },

    #[error("Pointer chain is empty")]
    EmptyChain,

    #[error("Address overflow at hop {hop}: {current:#x} + {offset:#x}")]
    AddressOverflow { hop: usize, current: u64, offset: i64 },

    #[error("Trainer identity rejected: {0}")]
    InvalidIdentity(IdentityRejection),

    #[error("Trainer identity not yet available")]
    IdentityUnavailable,

    #[error("Failed to parse save data: {0}")]
    SaveParse(String),

    #[error("Offset '{name}' missing from catalog {version}")]
    MissingOffset { version: String, name: String },

    #[error("Unsupported game version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(TeardownReason),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Transport failure or timeout while talking to the target
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Connection { .. } | Error::Timeout { .. })
    }

    /// A null pointer was met mid-chain; the structure may appear later
    pub fn is_structure_absent(&self) -> bool {
        matches!(self, Error::NullPointer { .. })
    }

    /// Catalog or deployment mismatch; never recoverable at runtime
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::MissingOffset { .. }
                | Error::UnsupportedVersion(_)
                | Error::InvalidCatalog(_)
                | Error::EmptyChain
        )
    }

    /// Whether waiting and re-resolving may succeed.
    ///
    /// Timeouts count as retryable; a closed connection does not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::NullPointer { .. }
                | Error::InvalidIdentity(_)
                | Error::IdentityUnavailable
                | Error::Timeout { .. }
        )
    }
}
