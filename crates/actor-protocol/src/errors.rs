//! Error Handling Guidelines
//!
//! All error messages should follow this format:
//!
//! 1. **What failed**: Describe the operation that failed
//! 2. **Why it failed**: Provide the root cause if known
//! 3. **What to do**: Suggest operator action when possible
//!
//! Examples:
//! - ✅ "Failed to connect to serial bridge 10.0.0.5:4001: Connection refused. Check that the bridge is running."
//! - ❌ "Connection error" (lacks context and action)
//!
//! Events that arrive in a phase where they mean nothing are *not* errors;
//! the state machine discards them silently.

use thiserror::Error;

/// Unified error type for actor operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActorError {
    /// Communication channel closed
    #[error("Channel closed: {0}")]
    ChannelClosed(String),

    /// Channel full, message not delivered
    #[error("Channel overloaded: {0}")]
    Overloaded(String),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ActorError {
    fn from(s: String) -> Self {
        ActorError::Other(s)
    }
}

impl From<&str> for ActorError {
    fn from(s: &str) -> Self {
        ActorError::Other(s.to_string())
    }
}
