//! Tracing bootstrap for hosts embedding the core.

use std::env;

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber. `DORO_DEBUG_LOG=1` forces debug output; otherwise
/// `RUST_LOG` applies, falling back to `info`. Safe to call more than once.
pub fn init() {
    let debug_enabled = env::var("DORO_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
