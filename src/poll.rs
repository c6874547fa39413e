//! Poll facade
//!
//! Everything the polling client reads goes through here. Reads copy state
//! under short-lived locks and never wait on the device or the executor.

use crate::command::CommandQueue;
use crate::detection::DetectionStore;
use crate::device::TelemetryStore;
use indexmap::IndexMap;
use std::sync::Arc;
use tello_bridge_shared::{codec, CommandRequest, Detection};
use tracing::warn;

/// Copy of the client-visible state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSnapshot {
    pub detections: Vec<Detection>,
    pub telemetry: IndexMap<String, String>,
    /// Queued ids the client can track
    pub backlog: Vec<i64>,
}

impl PollSnapshot {
    /// Render as the `/poll` response body
    pub fn render(&self) -> String {
        codec::render_poll_body(
            &self.detections,
            self.telemetry.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            &self.backlog,
        )
    }
}

/// Non-blocking read surface plus the emergency reset
pub struct PollFacade {
    detections: Arc<DetectionStore>,
    telemetry: Arc<TelemetryStore>,
    queue: Arc<CommandQueue>,
}

impl PollFacade {
    pub fn new(
        detections: Arc<DetectionStore>,
        telemetry: Arc<TelemetryStore>,
        queue: Arc<CommandQueue>,
    ) -> Self {
        Self {
            detections,
            telemetry,
            queue,
        }
    }

    /// Copy detections, telemetry and backlog
    pub async fn poll(&self) -> PollSnapshot {
        PollSnapshot {
            detections: self.detections.snapshot().await,
            telemetry: self.telemetry.snapshot().await,
            backlog: self.queue.backlog_ids().await,
        }
    }

    /// Drop all queued work and queue a landing instead
    ///
    /// A command the executor is already waiting on is not interrupted.
    pub async fn reset_all(&self) {
        warn!("Reset requested, replacing command queue with landing");
        self.queue.replace_all(CommandRequest::reset()).await;
    }
}
