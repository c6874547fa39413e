//! Shared bridge state
//!
//! Each entity carries its own lock, so a telemetry update never holds up
//! a poll or the executor.

use crate::capture::CaptureRendezvous;
use crate::command::CommandQueue;
use crate::detection::DetectionStore;
use crate::device::{ResponseSlot, TelemetryStore};
use crate::poll::PollFacade;
use std::sync::Arc;

/// Everything the long-running tasks share
#[derive(Clone, Default)]
pub struct BridgeState {
    pub queue: Arc<CommandQueue>,
    pub responses: Arc<ResponseSlot>,
    pub telemetry: Arc<TelemetryStore>,
    pub capture: Arc<CaptureRendezvous>,
    pub detections: Arc<DetectionStore>,
}

impl BridgeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read surface over this state
    pub fn poll_facade(&self) -> PollFacade {
        PollFacade::new(
            self.detections.clone(),
            self.telemetry.clone(),
            self.queue.clone(),
        )
    }
}
