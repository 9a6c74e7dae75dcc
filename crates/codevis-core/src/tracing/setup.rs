//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the codevis tracing/logging system.
///
/// Reads the `CODEVIS_LOG` environment variable for per-subsystem log levels.
/// Format: `CODEVIS_LOG=codevis_analysis=debug,codevis_storage=warn`
///
/// Falls back to `codevis=info` if `CODEVIS_LOG` is not set or is invalid.
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("CODEVIS_LOG")
            .unwrap_or_else(|_| EnvFilter::new("codevis=info"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .init();
    });
}
