//! Diagnostic logging.
//!
//! User-facing messages go through `cli::output`; this is the
//! developer-facing trace of pipeline stages, written to stderr.
//! `PPAP_LOG` takes an `EnvFilter` directive such as `ppap=debug`.

use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PPAP_LOG";

/// Install the global subscriber.
///
/// `PPAP_LOG` wins when set; otherwise `verbose` selects `debug` over
/// `error`, since warnings already reach the user through `cli::output`.
/// Calling this twice is harmless.
pub fn init(verbose: bool) {
    let fallback = if verbose { "ppap=debug" } else { "ppap=error" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .try_init();
}
