//! Blocking command handler
//!
//! Replies carry no correlation id. Whatever acceptable reply shows up
//! after the slot was cleared is taken as the answer, so a late reply to an
//! earlier command can be mistaken for this one.

use super::{send_redundant, HandlerContext};
use crate::command::CommandResult;
use tello_bridge_shared::{codec, CommandRequest};
use tokio::time::Instant;
use tracing::warn;

/// Handle a blocking command: send it and wait for an accepted reply
pub async fn handle_blocking(ctx: &HandlerContext, request: &CommandRequest) -> CommandResult {
    let payload = request.payload.as_str();

    ctx.responses.clear();
    if let Err(e) = send_redundant(ctx, payload).await {
        return CommandResult::Failed {
            message: format!("Failed to send '{}': {}", payload, e),
        };
    }

    let deadline = Instant::now() + ctx.config.reply_timeout;
    match ctx
        .responses
        .wait_for(deadline, |reply| codec::accepts_reply(payload, reply))
        .await
    {
        Some(reply) => CommandResult::Completed { reply },
        None => {
            warn!(
                "No accepted reply to '{}' within {:?} (last: {:?})",
                payload,
                ctx.config.reply_timeout,
                ctx.responses.latest()
            );
            CommandResult::TimedOut
        }
    }
}
