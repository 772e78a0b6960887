//! Logging setup for the CLI.
//!
//! Console output only; this is a one-shot tool. The level is chosen
//! from the CLI flags: `--debug` enables debug messages, `--quiet`
//! disables subscriber output entirely. Fatal errors bypass the
//! subscriber and are printed to stderr on exit, so they survive quiet
//! mode.

use tracing_subscriber::filter::LevelFilter;

/// Initialize the global tracing subscriber.
///
/// Must be called at most once per process.
pub fn init_logging(
    debug: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = if debug {
        LevelFilter::DEBUG
    } else if quiet {
        LevelFilter::OFF
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .without_time()
        .try_init()
}
