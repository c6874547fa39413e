//! Fire-and-forget command handler

use super::HandlerContext;
use crate::command::CommandResult;
use anyhow::Result;
use tello_bridge_shared::CommandRequest;
use tracing::debug;

/// Send `payload` back-to-back to make up for datagram loss
pub async fn send_redundant(ctx: &HandlerContext, payload: &str) -> Result<()> {
    debug!("{} > {}", payload, ctx.link.peer());
    for _ in 0..ctx.config.redundant_sends {
        ctx.link.send(payload).await?;
    }
    Ok(())
}

/// Handle a nonblocking command: send it and move on
pub async fn handle_nonblocking(ctx: &HandlerContext, request: &CommandRequest) -> CommandResult {
    match send_redundant(ctx, &request.payload).await {
        Ok(()) => CommandResult::Sent,
        Err(e) => CommandResult::Failed {
            message: format!("Failed to send '{}': {}", request.payload, e),
        },
    }
}
