//! Log output for the command-line tool.

use std::sync::Once;

use crate::cli::Verbosity;

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber.
///
/// `RUST_LOG` overrides the filter derived from `verbosity`. Safe to call
/// multiple times; only the first call has an effect.
pub fn init_tracing(verbosity: Verbosity) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
        // Fails only if another subscriber is already installed.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_level(true),
            )
            .with(filter)
            .try_init();
    });
}
