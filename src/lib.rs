//! Arena Queue - skill-based matchmaking queue core
//!
//! This crate accepts parties of players into a waiting pool and, on each
//! externally-driven round, decides which parties are combined into balanced
//! two-team groups. It is the decision core of a realtime multiplayer
//! backend's matchmaker: the tick driver, notification delivery, identity,
//! and persistence all live outside.

pub mod config;
pub mod error;
pub mod filter;
mod party;
pub mod queue;
pub mod state;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use config::QueueConfig;
pub use error::{QueueError, Result};
pub use queue::{MatchQueue, Queue};
pub use state::QueueState;
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
