//! Log event routing for the command line.
//!
//! The library reports through `tracing`. Events are off unless
//! `PDFSTITCH_LOG` holds a filter directive, e.g. `PDFSTITCH_LOG=debug` or
//! `PDFSTITCH_LOG=pdfstitch::outline=trace`. Output goes to stderr so it
//! never mixes with the merge plan on stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "PDFSTITCH_LOG";

/// Build the filter from [`LOG_ENV`], falling back to `default_filter`.
pub fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// Install the global subscriber.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_logging() {
    let formatting_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter("off"))
        .with(formatting_layer)
        .try_init();
}
