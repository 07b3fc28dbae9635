//! Session teardown signalling.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use strum::{Display, IntoStaticStr};

use crate::error::{Error, Result};

/// Why a session was stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum TeardownReason {
    /// The operator interrupted the process
    #[strum(serialize = "interrupted by operator")]
    Interrupted,
    /// The owner stopped the bot while its session was live
    #[strum(serialize = "bot stopped")]
    BotStopped,
    /// The session was torn down and its connection handed back
    #[strum(serialize = "session torn down")]
    SessionEnded,
}

/// Teardown signal shared between a session and whoever owns it.
///
/// Pointer walks check it between hops and retry waits return as soon as it
/// fires. The first reason recorded sticks; later triggers keep it.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    reason: Mutex<Option<TeardownReason>>,
    fired: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere cannot leave the Option half-written.
    fn state(&self) -> MutexGuard<'_, Option<TeardownReason>> {
        self.reason.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `reason` and wake every waiter.
    ///
    /// Returns the reason in effect, which is the earlier one when the signal
    /// had already fired.
    pub fn trigger(&self, reason: TeardownReason) -> TeardownReason {
        let mut state = self.state();
        let effective = *state.get_or_insert(reason);
        self.fired.notify_all();
        effective
    }

    pub fn reason(&self) -> Option<TeardownReason> {
        *self.state()
    }

    pub fn is_shutdown(&self) -> bool {
        self.reason().is_some()
    }

    /// [`Error::Cancelled`] carrying the reason once fired
    pub fn check(&self) -> Result<()> {
        match self.reason() {
            Some(reason) => Err(Error::Cancelled(reason)),
            None => Ok(()),
        }
    }

    /// Sleep up to `duration`, returning early with the reason if the signal
    /// fires. `None` means the full delay elapsed.
    pub fn wait(&self, duration: Duration) -> Option<TeardownReason> {
        let state = self.state();
        let (state, _) = self
            .fired
            .wait_timeout_while(state, duration, |reason| reason.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        *state
    }
}
