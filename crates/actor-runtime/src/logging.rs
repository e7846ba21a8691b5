//! Centralized logging for the actor system
//!
//! The `actor_*!` macros are thin wrappers over `tracing`, so actors log the
//! same way in tests and in the binaries. Output is controlled by whatever
//! subscriber is installed; `init_tracing` installs the default one.

use actor_protocol::ActorError;
use tracing_subscriber::EnvFilter;

/// Log debug-level message
///
/// # Example
/// ```
/// use actor_runtime::actor_debug;
/// actor_debug!("DriverActor: {:?} → {:?}", "Sleep", "StartLogging");
/// ```
#[macro_export]
macro_rules! actor_debug {
    ($($arg:tt)*) => {
        $crate::__private::tracing::debug!($($arg)*)
    };
}

/// Log info-level message
///
/// Use for state changes and operator-facing events
#[macro_export]
macro_rules! actor_info {
    ($($arg:tt)*) => {
        $crate::__private::tracing::info!($($arg)*)
    };
}

/// Log warning-level message
///
/// Use for recoverable errors and unexpected input
#[macro_export]
macro_rules! actor_warn {
    ($($arg:tt)*) => {
        $crate::__private::tracing::warn!($($arg)*)
    };
}

/// Log error-level message
#[macro_export]
macro_rules! actor_error {
    ($($arg:tt)*) => {
        $crate::__private::tracing::error!($($arg)*)
    };
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter` (e.g. `"info"` or
/// `"ctd_actors=debug,info"`). Fails if a subscriber is already installed or
/// the filter does not parse.
pub fn init_tracing(default_filter: &str) -> Result<(), ActorError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter).map_err(|e| {
            ActorError::Config(format!(
                "Invalid log filter '{}': {}. Use a tracing filter such as 'info' or 'ctd_actors=debug'.",
                default_filter, e
            ))
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ActorError::Config(format!("Logging already initialized: {}", e)))
}
