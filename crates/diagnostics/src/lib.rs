//! Lightweight structured logging shared by the PortFS workspace.
//!
//! Logging is off unless the `PORTFS_LOG` environment variable selects a
//! level:
//! - `PORTFS_LOG=off` (default) - silent
//! - `PORTFS_LOG=error`, `warn`, `info`, `debug` - increasing verbosity

use std::sync::Once;

// Re-export emit so the macros below expand against our copy of it.
pub use emit;

static INIT: Once = Once::new();

/// Initialize logging from the `PORTFS_LOG` environment variable.
///
/// Safe to call any number of times; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let level = std::env::var("PORTFS_LOG").unwrap_or_else(|_| "off".to_string());

        let min_level = match level.as_str() {
            "off" => return,
            "debug" => emit::Level::Debug,
            "info" => emit::Level::Info,
            "warn" => emit::Level::Warn,
            "error" => emit::Level::Error,
            other => {
                eprintln!("Warning: unknown PORTFS_LOG value '{}', using 'info'", other);
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min_level))
            .init();

        // The emit runtime must outlive every logging call site.
        std::mem::forget(rt);
    });
}

/// Log routine operations (opens, writes, lock transitions).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use $crate::emit;
        emit::info!($($arg)*)
    }};
}

/// Log detailed diagnostics (per-entry traversal steps, internal state).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        use $crate::emit;
        emit::debug!($($arg)*)
    }};
}

/// Log recoverable or advisory conditions (stale-lock takeovers, fallbacks).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        use $crate::emit;
        emit::warn!($($arg)*)
    }};
}

/// Log failures (backend errors, size-cap violations, rename failures).
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use $crate::emit;
        emit::error!($($arg)*)
    }};
}

pub use init_diagnostics as init;
