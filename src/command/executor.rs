//! Command executor - drains the queue and dispatches by command kind

use super::handlers::{self, ExecutorConfig, HandlerContext};
use super::queue::CommandQueue;
use crate::capture::CaptureRendezvous;
use crate::device::ResponseSlot;
use crate::transport::DeviceLink;
use std::fmt;
use std::sync::Arc;
use tello_bridge_shared::{verbs, CommandKind, CommandRequest};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Nonblocking command handed to the transport
    Sent,
    /// Device reply accepted for a blocking command
    Completed { reply: String },
    /// No accepted reply before the ceiling
    TimedOut,
    /// Frame written by the producer
    Captured { filename: String },
    /// Command could not be carried out
    Failed { message: String },
}

impl fmt::Display for CommandResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResult::Sent => write!(f, "sent"),
            CommandResult::Completed { reply } => write!(f, "{}", reply),
            CommandResult::TimedOut => write!(f, "{}", verbs::TIMEOUT_SENTINEL),
            CommandResult::Captured { filename } => write!(f, "captured {}", filename),
            CommandResult::Failed { message } => write!(f, "failed: {}", message),
        }
    }
}

/// The only writer to the device command channel
///
/// Commands run one at a time in queue order, whatever their kind.
pub struct CommandExecutor {
    queue: Arc<CommandQueue>,
    ctx: HandlerContext,
}

impl CommandExecutor {
    /// Create a new command executor
    pub fn new(
        link: Arc<dyn DeviceLink>,
        queue: Arc<CommandQueue>,
        responses: Arc<ResponseSlot>,
        capture: Arc<CaptureRendezvous>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            queue,
            ctx: HandlerContext {
                link,
                responses,
                capture,
                config,
            },
        }
    }

    /// Execute a single command right away, bypassing the queue
    pub async fn execute(&self, request: &CommandRequest) -> CommandResult {
        let start = Instant::now();
        debug!(
            "Executing command: id={} kind={} payload='{}'",
            request.id, request.kind, request.payload
        );

        let result = match request.kind {
            CommandKind::Nonblocking => handlers::handle_nonblocking(&self.ctx, request).await,
            CommandKind::Blocking => handlers::handle_blocking(&self.ctx, request).await,
            CommandKind::LocalAction => handlers::handle_local_action(&self.ctx, request).await,
        };

        match &result {
            CommandResult::Sent => debug!("  '{}' sent", request.payload),
            CommandResult::Failed { message } => {
                warn!("  Command {} '{}' failed: {}", request.id, request.payload, message)
            }
            other => info!(
                "  Command {} '{}' -> {} ({}ms)",
                request.id,
                request.payload,
                other,
                start.elapsed().as_millis()
            ),
        }

        result
    }

    /// Drain the queue forever
    pub async fn run(&self) {
        info!("[EXEC] Command executor started");
        loop {
            let entry = self.queue.dequeue_front().await;
            self.execute(&entry.request).await;
            if !self.queue.complete(entry.ticket).await {
                debug!("  Queue was reset while '{}' ran", entry.request.payload);
            }
        }
    }
}
