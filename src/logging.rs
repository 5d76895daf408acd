//! Logging initialization.
//!
//! The crate logs through the `log` facade; the embedding application decides
//! the backend. `init` wires up `env_logger` for binaries and tests that want
//! output without further ceremony. `RUST_LOG` always wins over the
//! configured default.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes `env_logger` with the given default filter. Safe to call more
/// than once; only the first call takes effect.
pub fn init(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level.to_string());
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env).format_timestamp_secs().try_init();
    });
}
