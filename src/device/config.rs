//! Device endpoint configuration

use tello_bridge_shared::ports;

/// Network endpoints of the device channels
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Where commands are sent (e.g. "192.168.10.1:8889")
    pub device_addr: String,
    /// Local bind of the command socket; device replies arrive here
    pub reply_bind: String,
    /// Local bind of the telemetry broadcast socket
    pub telemetry_bind: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            device_addr: ports::DEVICE_ADDR.into(),
            reply_bind: ports::REPLY_BIND.into(),
            telemetry_bind: ports::TELEMETRY_BIND.into(),
        }
    }
}
