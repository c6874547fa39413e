//! UDP transport for the device command channel

use crate::transport::traits::DeviceLink;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Sends commands from the shared command socket
///
/// The same socket receives the device replies, so it is handed to the
/// reply reader as well.
pub struct UdpDeviceLink {
    socket: Arc<UdpSocket>,
    device_addr: SocketAddr,
}

impl UdpDeviceLink {
    pub fn new(socket: Arc<UdpSocket>, device_addr: SocketAddr) -> Self {
        Self {
            socket,
            device_addr,
        }
    }

    /// Bind the command socket and resolve the device address
    pub async fn bind(bind_addr: &str, device_addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await?;
        let device_addr = tokio::net::lookup_host(device_addr)
            .await?
            .next()
            .ok_or_else(|| anyhow!("Cannot resolve device address {}", device_addr))?;
        Ok(Self::new(Arc::new(socket), device_addr))
    }

    /// Socket shared with the reply reader
    pub fn socket(&self) -> Arc<UdpSocket> {
        self.socket.clone()
    }
}

#[async_trait]
impl DeviceLink for UdpDeviceLink {
    async fn send(&self, payload: &str) -> Result<()> {
        self.socket
            .send_to(payload.as_bytes(), self.device_addr)
            .await?;
        Ok(())
    }

    fn peer(&self) -> String {
        self.device_addr.to_string()
    }
}
