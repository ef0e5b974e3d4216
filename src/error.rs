//! Error types for the matchmaking queue
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific matchmaking scenarios
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Group creation was not attempted because too few players are queued.
    /// Recoverable: retry on the next round.
    #[error("not enough players to create a group")]
    NotEnoughPlayers,

    /// The queue was used before its filter chain was built. Programmer misuse.
    #[error("queue is not initialized")]
    NotInitialized,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}
