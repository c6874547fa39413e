//! Transport trait abstraction for the device command channel

use anyhow::Result;
use async_trait::async_trait;

/// Outbound half of the device command channel
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Send one command datagram to the device
    async fn send(&self, payload: &str) -> Result<()>;

    /// Human-readable peer description
    fn peer(&self) -> String;
}
