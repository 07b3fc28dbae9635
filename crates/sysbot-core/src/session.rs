//! One bot session per live connection.
//!
//! A [`BotSession`] owns its connection exclusively, borrows the offset
//! catalog for the pinned game version and carries the session's log writer
//! and, once bootstrapped, its trainer identity. Routine behaviour lives
//! outside and drives the session through its methods.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::connection::SwitchConnection;
use crate::error::{Error, Result};
use crate::identity::{SaveParser, TrainerIdentity, bootstrap};
use crate::logbook::{LogBook, SessionLog};
use crate::offset::{CatalogRegistry, ChainName, GameFamily, OffsetCatalog, ShiftName};
use crate::pointer::{self, ResolvedAddress};
use crate::retry::RetryStrategy;
use crate::shutdown::{ShutdownSignal, TeardownReason};

/// Configuration for a bot session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Game family of the target
    pub family: GameFamily,
    /// Exact game version string the target runs
    pub version: String,
    /// Identifier for log filing before the identity is known;
    /// defaults to the connection name
    pub provisional_label: Option<String>,
}

impl SessionConfig {
    pub fn builder(family: GameFamily) -> SessionConfigBuilder {
        SessionConfigBuilder {
            family,
            version: None,
            provisional_label: None,
        }
    }
}

/// Builder for SessionConfig
#[derive(Debug, Clone)]
pub struct SessionConfigBuilder {
    family: GameFamily,
    version: Option<String>,
    provisional_label: Option<String>,
}

impl SessionConfigBuilder {
    /// Pin the game version
    pub fn version<S: Into<String>>(mut self, version: S) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the provisional log identifier
    pub fn provisional_label<S: Into<String>>(mut self, label: S) -> Self {
        self.provisional_label = Some(label.into());
        self
    }

    /// Build the configuration.
    ///
    /// Without an explicit version the newest builtin catalog of the family
    /// is used.
    pub fn build(self) -> SessionConfig {
        let version = self
            .version
            .unwrap_or_else(|| default_version(self.family).to_string());
        SessionConfig {
            family: self.family,
            version,
            provisional_label: self.provisional_label,
        }
    }
}

fn default_version(family: GameFamily) -> &'static str {
    use crate::offset::{BDSP_VERSION, LA_VERSION, SV_VERSION, SWSH_VERSION};
    match family {
        GameFamily::SwordShield => SWSH_VERSION,
        GameFamily::BrilliantDiamond => BDSP_VERSION,
        GameFamily::LegendsArceus => LA_VERSION,
        GameFamily::ScarletViolet => SV_VERSION,
    }
}

pub struct BotSession<'a, C: SwitchConnection> {
    connection: C,
    catalog: &'a OffsetCatalog,
    identity: Option<TrainerIdentity>,
    log: SessionLog,
    shutdown: Arc<ShutdownSignal>,
}

impl<'a, C: SwitchConnection> BotSession<'a, C> {
    /// Create a session filing logs under the connection name until identified
    pub fn new(connection: C, catalog: &'a OffsetCatalog, book: Arc<LogBook>) -> Self {
        let provisional = connection.name().to_string();
        Self::with_provisional(connection, catalog, book, provisional)
    }

    pub fn from_config(
        connection: C,
        registry: &'a CatalogRegistry,
        config: &SessionConfig,
        book: Arc<LogBook>,
    ) -> Result<Self> {
        let catalog = registry.get(config.family, &config.version)?;
        let provisional = config
            .provisional_label
            .clone()
            .unwrap_or_else(|| connection.name().to_string());
        Ok(Self::with_provisional(connection, catalog, book, provisional))
    }

    fn with_provisional(
        connection: C,
        catalog: &'a OffsetCatalog,
        book: Arc<LogBook>,
        provisional: String,
    ) -> Self {
        debug!(
            "New session on {} using catalog {}",
            connection.name(),
            catalog.key()
        );
        Self {
            connection,
            catalog,
            identity: None,
            log: SessionLog::new(book, provisional),
            shutdown: Arc::new(ShutdownSignal::new()),
        }
    }

    /// Stop this session through an externally owned signal
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownSignal>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn catalog(&self) -> &'a OffsetCatalog {
        self.catalog
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    pub fn log(&self) -> &SessionLog {
        &self.log
    }

    pub fn identity(&self) -> Option<&TrainerIdentity> {
        self.identity.as_ref()
    }

    /// The identity, or [`Error::IdentityUnavailable`] before bootstrap
    pub fn require_identity(&self) -> Result<&TrainerIdentity> {
        self.identity.as_ref().ok_or(Error::IdentityUnavailable)
    }

    /// Handle for stopping this session from another thread
    pub fn shutdown_handle(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    pub fn resolve(&mut self, name: ChainName) -> Result<ResolvedAddress> {
        pointer::resolve_named(
            &mut self.connection,
            self.catalog,
            name,
            Some(&self.shutdown),
        )
    }

    pub fn read(&mut self, name: ChainName, length: usize) -> Result<Vec<u8>> {
        pointer::read_named(
            &mut self.connection,
            self.catalog,
            name,
            length,
            Some(&self.shutdown),
        )
    }

    pub fn read_shifted_byte(&mut self, chain: ChainName, shift: ShiftName) -> Result<u8> {
        pointer::read_shifted_byte(
            &mut self.connection,
            self.catalog,
            chain,
            shift,
            Some(&self.shutdown),
        )
    }

    /// Resolve `name` and write `data` at the resolved address
    pub fn write(&mut self, name: ChainName, data: &[u8]) -> Result<()> {
        let resolved = self.resolve(name)?;
        self.connection.write_bytes(resolved.address, data)
    }

    /// Read the trainer block, derive the identity and switch log filing to
    /// its label.
    ///
    /// Runs once per session; later calls return the stored identity. On
    /// failure nothing is migrated and the session stays unidentified.
    pub fn identify<P: SaveParser + ?Sized>(&mut self, parser: &P) -> Result<&TrainerIdentity> {
        if self.identity.is_some() {
            return self.require_identity();
        }

        let size = self.catalog.trainer_block_size();
        let raw = self
            .read(ChainName::MyStatus, size)
            .map_err(|e| self.log_teardown(e))?;

        let identity = match bootstrap(parser, &raw) {
            Ok(identity) => identity,
            Err(e) => {
                self.log.warn(format!("Trainer data not usable yet: {}", e));
                return Err(e);
            }
        };

        if let Err(e) = self.shutdown.check() {
            return Err(self.log_teardown(e));
        }

        let provisional = self.log.active_id();
        let label = identity.label();
        self.connection.set_label(label.clone());
        self.log.migrate(&provisional, &label);
        self.log.info(format!(
            "{} identified as {}, using {}.",
            self.connection.name(),
            label,
            identity.language()
        ));

        Ok(&*self.identity.insert(identity))
    }

    /// [`BotSession::identify`] with retries on recoverable failures.
    ///
    /// Structure-absent, identity-invalid and timeout errors are retried as
    /// long as `strategy` yields a delay; anything else is returned at once.
    /// Stopping the session interrupts the wait with [`Error::Cancelled`].
    pub fn identify_with_retry<P, R>(
        &mut self,
        parser: &P,
        strategy: &R,
    ) -> Result<&TrainerIdentity>
    where
        P: SaveParser + ?Sized,
        R: RetryStrategy + ?Sized,
    {
        let mut retry = 0u32;
        loop {
            let err = match self.identify(parser) {
                Ok(_) => break,
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            retry += 1;
            let Some(delay) = strategy.next_delay(retry) else {
                warn!("Giving up on identification after {} retries", retry - 1);
                return Err(err);
            };

            info!(
                "Identification failed ({}), retrying in {}ms (retry {})",
                err,
                delay.as_millis(),
                retry
            );
            if let Some(reason) = self.shutdown.wait(delay) {
                return Err(self.log_teardown(Error::Cancelled(reason)));
            }
        }

        self.require_identity()
    }

    /// Record a cancellation in the session log before surfacing it
    fn log_teardown(&self, err: Error) -> Error {
        if let Error::Cancelled(reason) = &err {
            self.log.warn(format!(
                "Session on {} stopped: {}",
                self.connection.name(),
                reason
            ));
        }
        err
    }

    /// Stop the session and hand back its connection.
    ///
    /// If the signal already fired, its original reason is the one logged.
    pub fn teardown(self) -> C {
        let reason = self.shutdown.trigger(TeardownReason::SessionEnded);
        debug!("Session on {} torn down", self.connection.name());
        self.log
            .info(format!("Session on {} ended: {}", self.connection.name(), reason));
        self.connection
    }
}
