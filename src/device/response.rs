//! Device reply slot
//!
//! The device answers on the command socket without echoing the command,
//! so there is nothing to match replies against. The slot only keeps the
//! newest reply; the executor clears it right before sending and takes the
//! first acceptable reply that shows up afterwards.

use std::sync::Arc;
use tello_bridge_shared::{codec, ports};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info};

/// Single-slot buffer holding the most recent device reply
pub struct ResponseSlot {
    tx: watch::Sender<Option<String>>,
}

impl ResponseSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Overwrite the slot with a new reply (last write wins)
    pub fn publish(&self, reply: String) {
        self.tx.send_replace(Some(reply));
    }

    /// Drop whatever reply is currently held
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Copy of the current reply, if any
    pub fn latest(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// Wait until the slot holds a reply accepted by `accept`
    ///
    /// Returns `None` if nothing acceptable arrived before `deadline`.
    pub async fn wait_for<F>(&self, deadline: Instant, mut accept: F) -> Option<String>
    where
        F: FnMut(&str) -> bool,
    {
        let mut rx = self.tx.subscribe();
        let waited = timeout_at(
            deadline,
            rx.wait_for(|reply| reply.as_deref().is_some_and(&mut accept)),
        )
        .await;

        match waited {
            Ok(Ok(reply)) => reply.clone(),
            _ => None,
        }
    }
}

impl Default for ResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive replies from the command socket until it fails
///
/// A receive error ends the reader for good; there is no reconnect.
pub async fn run_reply_reader(socket: Arc<UdpSocket>, slot: Arc<ResponseSlot>) {
    info!("[REPLY] Reader started");
    let mut buf = vec![0u8; ports::MAX_DATAGRAM];

    loop {
        match socket.recv_from(&mut buf).await {
            Ok((n, addr)) => {
                let reply = codec::decode_reply(&buf[..n]);
                debug!("[REPLY] {} < {}", reply.trim_end(), addr);
                slot.publish(reply);
            }
            Err(e) => {
                error!("[REPLY] Receive failed, reader stopped: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_publish_overwrites_and_clear_empties() {
        let slot = ResponseSlot::new();
        assert_eq!(slot.latest(), None);

        slot.publish("ok".into());
        slot.publish("error".into());
        assert_eq!(slot.latest().as_deref(), Some("error"));

        slot.clear();
        assert_eq!(slot.latest(), None);
    }

    #[tokio::test]
    async fn test_wait_for_returns_current_accepted_reply() {
        let slot = ResponseSlot::new();
        slot.publish("ok".into());

        let deadline = Instant::now() + Duration::from_millis(50);
        let reply = slot.wait_for(deadline, |r| r.starts_with("ok")).await;
        assert_eq!(reply.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_wait_for_skips_rejected_replies() {
        let slot = Arc::new(ResponseSlot::new());
        let writer = slot.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.publish("error".into());
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.publish("ok".into());
        });

        let deadline = Instant::now() + Duration::from_secs(2);
        let reply = slot.wait_for(deadline, |r| r.starts_with("ok")).await;
        assert_eq!(reply.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_wait_for_times_out() {
        let slot = ResponseSlot::new();
        slot.publish("error".into());

        let start = Instant::now();
        let deadline = start + Duration::from_millis(100);
        let reply = slot.wait_for(deadline, |r| r.starts_with("ok")).await;
        assert_eq!(reply, None);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_reply_reader_fills_slot() {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let slot = Arc::new(ResponseSlot::new());
        tokio::spawn(run_reply_reader(socket, slot.clone()));

        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        device.send_to(b"ok\r\n", addr).await.unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let reply = slot.wait_for(deadline, |r| !r.is_empty()).await;
        assert_eq!(reply.as_deref(), Some("ok\r\n"));
    }
}
