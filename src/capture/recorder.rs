//! Video stream recorder
//!
//! Frame producer for the capture rendezvous. Keeps a bounded tail of the
//! raw video stream and dumps it to the requested file.

use super::rendezvous::{CaptureRendezvous, CaptureRequest};
use anyhow::Result;
use bytes::{Buf, BytesMut};
use std::sync::Arc;
use tello_bridge_shared::ports;
use tokio::net::UdpSocket;
use tracing::{error, info, warn};

/// Configuration for the capture side channel
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Local bind of the raw video stream
    pub video_bind: String,
    /// Number of stream bytes kept for the next capture
    pub tail_bytes: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            video_bind: ports::VIDEO_BIND.into(),
            tail_bytes: 1024 * 1024,
        }
    }
}

/// Services capture requests from the most recent stream bytes
pub struct StreamRecorder {
    socket: UdpSocket,
    rendezvous: Arc<CaptureRendezvous>,
    tail: BytesMut,
    max_tail: usize,
}

impl StreamRecorder {
    pub fn new(socket: UdpSocket, rendezvous: Arc<CaptureRendezvous>, max_tail: usize) -> Self {
        Self {
            socket,
            rendezvous,
            tail: BytesMut::with_capacity(max_tail),
            max_tail,
        }
    }

    /// Bind the video socket
    pub async fn bind(config: &CaptureConfig, rendezvous: Arc<CaptureRendezvous>) -> Result<Self> {
        let socket = UdpSocket::bind(&config.video_bind).await?;
        Ok(Self::new(socket, rendezvous, config.tail_bytes))
    }

    fn push(&mut self, data: &[u8]) {
        self.tail.extend_from_slice(data);
        if self.tail.len() > self.max_tail {
            let excess = self.tail.len() - self.max_tail;
            self.tail.advance(excess);
        }
    }

    async fn save(&self, request: &CaptureRequest) -> Result<()> {
        if self.tail.is_empty() {
            warn!("[CAPTURE] No stream data yet, writing empty {}", request.filename);
        }
        tokio::fs::write(&request.filename, &self.tail[..]).await?;
        Ok(())
    }

    /// Receive stream data and service capture requests until the socket fails
    pub async fn run(mut self) {
        info!("[CAPTURE] Recorder started");
        let mut buf = vec![0u8; 2048];

        loop {
            tokio::select! {
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((n, _addr)) => self.push(&buf[..n]),
                        Err(e) => {
                            error!("[CAPTURE] Stream receive failed, recorder stopped: {}", e);
                            break;
                        }
                    }
                }

                Some(request) = self.rendezvous.next_request() => {
                    match self.save(&request).await {
                        Ok(()) => info!("[CAPTURE] captured: {}", request.filename),
                        Err(e) => error!("[CAPTURE] Failed to write {}: {}", request.filename, e),
                    }
                    self.rendezvous.complete(&request);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn recorder(max_tail: usize) -> (StreamRecorder, Arc<CaptureRendezvous>) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let rendezvous = Arc::new(CaptureRendezvous::new());
        (StreamRecorder::new(socket, rendezvous.clone(), max_tail), rendezvous)
    }

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();
        assert_eq!(config.video_bind, "0.0.0.0:11111");
        assert_eq!(config.tail_bytes, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_tail_is_bounded() {
        let (mut rec, _) = recorder(8).await;
        rec.push(b"0123456");
        rec.push(b"789ab");
        assert_eq!(rec.tail.len(), 8);
        assert_eq!(&rec.tail[..], b"456789ab");
    }

    #[tokio::test]
    async fn test_capture_writes_stream_tail() {
        let (rec, rendezvous) = recorder(1024).await;
        let video_addr = rec.socket.local_addr().unwrap();
        tokio::spawn(rec.run());

        let camera = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        camera.send_to(b"frame-bytes", video_addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let path = std::env::temp_dir().join(format!("tello-capture-{}.h264", std::process::id()));
        let filename = path.to_string_lossy().to_string();
        rendezvous
            .request(&filename, Some(Duration::from_secs(2)))
            .await
            .unwrap();

        let written = tokio::fs::read(&path).await.unwrap();
        assert_eq!(written, b"frame-bytes");
        let _ = tokio::fs::remove_file(&path).await;
    }
}
