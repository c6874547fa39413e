//! Device Bridge Module
//!
//! Inbound side of the device protocol: the reply slot fed from the command
//! socket and the telemetry store fed from the broadcast socket.

mod config;
mod response;
mod telemetry;

pub use config::DeviceConfig;
pub use response::{run_reply_reader, ResponseSlot};
pub use telemetry::{run_telemetry_reader, TelemetryStore};
