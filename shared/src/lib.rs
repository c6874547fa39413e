//! Tello Bridge Shared Protocol Types
//!
//! This crate provides the request model, the text codec and the timing
//! parameters shared by the bridge and the mock device.

pub mod codec;
pub mod request;

// Re-export commonly used types at crate root
pub use codec::Detection;
pub use request::{ClientRequest, CommandKind, CommandRequest, ProtocolError};

/// Timing parameters for the command pipeline
pub mod timing {
    /// How many times every command datagram is sent back-to-back
    pub const REDUNDANT_SENDS: usize = 3;

    /// Ceiling for a blocking command to receive an accepted reply
    pub const REPLY_TIMEOUT_MS: u64 = 15_000;

    /// Ceiling for the frame producer to service a capture request
    pub const CAPTURE_TIMEOUT_MS: u64 = 30_000;

    /// Telemetry broadcast period of the device
    pub const TELEMETRY_INTERVAL_MS: u64 = 100;
}

/// Fixed command vocabulary
pub mod verbs {
    /// Verbs sent fire-and-forget, always with id -1
    pub const NONBLOCKING_VERBS: &[&str] = &["rc"];

    /// Verbs handled inside the bridge, never sent to the device
    pub const LOCAL_ACTION_VERBS: &[&str] = &["capture"];

    /// Local action that saves the current video frame
    pub const CAPTURE: &str = "capture";

    /// Prefix of a successful device reply
    pub const SUCCESS_MARKER: &str = "ok";

    /// Result reported when a blocking command gets no accepted reply
    pub const TIMEOUT_SENTINEL: &str = "timeout";

    /// Command queued by the emergency reset
    pub const RESET_COMMAND: &str = "land";

    /// Id given to the emergency reset command
    pub const RESET_ID: i64 = 0;

    /// Id given to every nonblocking command
    pub const NONBLOCKING_ID: i64 = -1;
}

/// Default network endpoints
pub mod ports {
    /// Device command address
    pub const DEVICE_ADDR: &str = "192.168.10.1:8889";

    /// Local bind for the command socket; replies arrive here
    pub const REPLY_BIND: &str = "0.0.0.0:8889";

    /// Local bind for the telemetry broadcast
    pub const TELEMETRY_BIND: &str = "0.0.0.0:8890";

    /// Local bind for the raw video stream
    pub const VIDEO_BIND: &str = "0.0.0.0:11111";

    /// HTTP port the Scratch extension talks to
    pub const HTTP_PORT: u16 = 10105;

    /// Largest datagram read from the device
    pub const MAX_DATAGRAM: usize = 1518;
}
