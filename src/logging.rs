//! Diagnostic logging
//!
//! Logs go to stderr so stdout stays clean for `--json` output. `RUST_LOG`
//! takes precedence over `--verbose`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,keyhint=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(verbose: bool) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    tracing_subscriber::registry().with(filter).with(layer).try_init()
}
