//! # sysbot-core
//!
//! Core library for remote game-process bots.
//!
//! This crate provides:
//! - Per-version offset catalogs (base addresses, pointer chains, byte shifts)
//! - Pointer-chain resolution over a live connection
//! - Trainer identity bootstrap from save data
//! - Session-partitioned log buffering with provisional-to-resolved migration
//! - Response shapes for the fleet-control API
//!
//! The transport, the save-data parser and the routine state machines are
//! supplied by the caller through [`SwitchConnection`] and [`SaveParser`].

pub mod connection;
pub mod dto;
pub mod error;
pub mod identity;
pub mod logbook;
pub mod offset;
pub mod pointer;
pub mod retry;
pub mod session;
pub mod shutdown;

pub use connection::{Fault, MockConnection, MockConnectionBuilder, POINTER_SIZE, SwitchConnection};
pub use dto::{
    ApiResponse, BaseResponse, BatchCommandPayload, BotInfo, BotsPayload, CommandResult, Empty,
    IdleStatus, IdleStatusPayload, InstanceInfo, InstancesPayload,
};
pub use error::{Error, Result};
pub use identity::{
    IdentityRejection, Language, ParsedTrainer, SaveParser, TrainerIdentity, bootstrap,
    format_label,
};
pub use logbook::{LogBook, LogEntry, LogLevel, SessionLog};
pub use offset::{
    BaseName, CatalogDump, CatalogRegistry, ChainBase, ChainName, GameFamily, OffsetCatalog,
    OffsetCatalogBuilder, PointerChain, ShiftName, builtin_catalogs, load_catalog, save_catalog,
};
pub use pointer::{
    ResolvedAddress, read_chain, read_named, resolve, resolve_cancellable, resolve_chain,
    resolve_named,
};
pub use retry::{ExponentialBackoff, FixedDelay, NoRetry, RetryStrategy};
pub use session::{BotSession, SessionConfig, SessionConfigBuilder};
pub use shutdown::{ShutdownSignal, TeardownReason};
