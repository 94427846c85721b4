//! Tracing subscriber setup for binaries and examples.
//!
//! Library code only emits events. Call [`init_logging`] once near the top
//! of `main`; the filter defaults to `info` and follows `RUST_LOG` when set.

use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Another global subscriber or logger is already in place
    #[error("Failed to install the tracing subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Install a global fmt subscriber writing to stderr, as JSON lines when
/// `json` is set.
///
/// Once a call has installed the subscriber, later calls do nothing.
///
/// # Errors
///
/// Fails when another global subscriber was installed elsewhere.
pub fn init_logging(json: bool) -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(layer.json().with_current_span(false)).try_init()?;
    } else {
        registry.with(layer).try_init()?;
    }

    let _ = INSTALLED.set(());
    Ok(())
}
