//! Command handlers for the three command kinds

mod blocking;
mod capture;
mod nonblocking;

pub use blocking::handle_blocking;
pub use capture::handle_local_action;
pub use nonblocking::{handle_nonblocking, send_redundant};

use crate::capture::CaptureRendezvous;
use crate::device::ResponseSlot;
use crate::transport::DeviceLink;
use std::sync::Arc;
use std::time::Duration;
use tello_bridge_shared::timing;

/// Timing knobs for command execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Ceiling for a blocking command's reply
    pub reply_timeout: Duration,
    /// Copies of each datagram sent to the device
    pub redundant_sends: usize,
    /// Ceiling for a capture; `None` waits for the producer forever
    pub capture_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_millis(timing::REPLY_TIMEOUT_MS),
            redundant_sends: timing::REDUNDANT_SENDS,
            capture_timeout: Some(Duration::from_millis(timing::CAPTURE_TIMEOUT_MS)),
        }
    }
}

/// Context passed to command handlers
#[derive(Clone)]
pub struct HandlerContext {
    pub link: Arc<dyn DeviceLink>,
    pub responses: Arc<ResponseSlot>,
    pub capture: Arc<CaptureRendezvous>,
    pub config: ExecutorConfig,
}
