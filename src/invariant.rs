//! Internal consistency checks
//!
//! Loggers and statistics carry an [`Invariants`] policy instead of relying on
//! `debug_assert!`: development builds crash loudly on a broken invariant,
//! release builds keep going and leave a trace event behind.

use serde::{Deserialize, Serialize};

/// What to do when an internal invariant does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invariants {
    /// Panic on violation.
    Enforce,
    /// Emit a `trace` event and carry on.
    Ignore,
}

impl Default for Invariants {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Enforce
        } else {
            Self::Ignore
        }
    }
}

impl Invariants {
    /// Check `holds`, reacting according to the policy.
    ///
    /// The message is built lazily so release builds pay nothing for it.
    ///
    /// # Panics
    ///
    /// Panics under [`Invariants::Enforce`] when `holds` is false.
    #[track_caller]
    pub fn check(self, holds: bool, message: impl FnOnce() -> String) {
        if holds {
            return;
        }
        match self {
            Self::Enforce => panic!("invariant violated: {}", message()),
            Self::Ignore => tracing::trace!(reason = %message(), "invariant violated"),
        }
    }

    /// Whether violations panic.
    #[must_use]
    pub const fn is_enforced(self) -> bool {
        matches!(self, Self::Enforce)
    }
}
