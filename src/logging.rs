//! Tracing subscriber setup for binaries and demos.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the application.

use std::io::IsTerminal;
use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Subscriber installation failure.
#[derive(Debug, Error)]
pub enum InitError {
    /// [`init_tracing`] already ran in this process.
    #[error("tracing subscriber already initialised")]
    AlreadyInitialised,
    /// Another global subscriber was installed first.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// # Errors
///
/// Returns [`InitError::AlreadyInitialised`] on a second call, and
/// [`InitError::Install`] if a global subscriber is already set.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|()| InitError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InitError::Install(e.to_string()))
}
