//! Command execution infrastructure for the bridge
//!
//! This module handles:
//! - Queueing client requests with id deduplication
//! - Serialising all device traffic through one executor
//! - Correlating blocking commands with device replies
//! - Handing capture requests to the frame producer

mod executor;
pub mod handlers;
mod queue;

pub use executor::{CommandExecutor, CommandResult};
pub use handlers::ExecutorConfig;
pub use queue::CommandQueue;
