//! Instance lifecycle: installing, activating, controlling.

use std::fmt;

use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Where an agent instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this instance will never control requests.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

struct Inner {
    state: WorkerState,
    skip_waiting: bool,
    claimed: bool,
}

/// Lifecycle state plus the two signals sent to the host: skip the
/// wait-for-idle phase after install, and claim the scope after activation.
pub struct Lifecycle {
    inner: Mutex<Inner>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { inner: Mutex::new(Inner { state: WorkerState::Parsed, skip_waiting: false, claimed: false }) }
    }
}

impl Lifecycle {
    pub fn state(&self) -> WorkerState {
        self.inner.lock().state
    }

    /// Whether the instance asked to activate without waiting for old ones to go idle.
    pub fn skip_waiting(&self) -> bool {
        self.inner.lock().skip_waiting
    }

    /// Whether intercepted requests should be routed through the policies.
    pub fn is_controlling(&self) -> bool {
        let inner = self.inner.lock();
        inner.claimed && inner.state == WorkerState::Activated
    }

    /// A fresh instance or one whose install failed may (re)install.
    pub(crate) fn begin_install(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        match inner.state {
            WorkerState::Parsed | WorkerState::Redundant => {
                inner.state = WorkerState::Installing;
                inner.skip_waiting = true;
                Ok(())
            }
            other => Err(Error::InvalidState { action: "install", state: other.to_string() }),
        }
    }

    pub(crate) fn finish_install(&self, succeeded: bool) {
        let mut inner = self.inner.lock();
        inner.state = if succeeded { WorkerState::Installed } else { WorkerState::Redundant };
    }

    /// Activation only follows a completed install.
    pub(crate) fn begin_activate(&self) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        match inner.state {
            WorkerState::Installed => {
                inner.state = WorkerState::Activating;
                Ok(())
            }
            other => Err(Error::InvalidState { action: "activate", state: other.to_string() }),
        }
    }

    pub(crate) fn finish_activate(&self) {
        let mut inner = self.inner.lock();
        inner.state = WorkerState::Activated;
        inner.claimed = true;
    }
}
