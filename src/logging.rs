//! Diagnostic logging.
//!
//! Library code emits `tracing` events; only the CLI commands install a
//! subscriber (the TUI owns the terminal and leaves logging off).

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbosity` picks the level
/// (0 = warn, 1 = info, 2+ = debug).
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // A second init (e.g., from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
