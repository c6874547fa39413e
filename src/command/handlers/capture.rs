//! Local action handler

use super::HandlerContext;
use crate::command::CommandResult;
use tello_bridge_shared::{verbs, CommandRequest};

/// Handle a command that never reaches the device
///
/// `capture <filename>` waits until the frame producer has written the
/// current frame to `filename`.
pub async fn handle_local_action(ctx: &HandlerContext, request: &CommandRequest) -> CommandResult {
    match request.verb() {
        verbs::CAPTURE => {
            let Some(filename) = request.args().next() else {
                return CommandResult::Failed {
                    message: "capture needs a filename".into(),
                };
            };

            match ctx.capture.request(filename, ctx.config.capture_timeout).await {
                Ok(()) => CommandResult::Captured {
                    filename: filename.to_string(),
                },
                Err(e) => CommandResult::Failed {
                    message: e.to_string(),
                },
            }
        }
        other => CommandResult::Failed {
            message: format!("Unknown local action '{}'", other),
        },
    }
}
