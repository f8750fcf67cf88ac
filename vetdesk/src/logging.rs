//! Diagnostic tracing for the client.
//!
//! Form errors and listings are printed by the CLI itself. Tracing carries the
//! backend calls behind them (status codes, discarded sessions, stale breed
//! lists) and is off below `warn` unless asked for.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "warn";
const VERBOSE_FILTER: &str = "warn,vetdesk=debug";

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks between `warn` and
/// debug output for this crate.
///
/// ```bash
/// RUST_LOG=vetdesk::io::http=debug vetdesk search --species 1
/// ```
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .compact(),
        )
        .init();
}
