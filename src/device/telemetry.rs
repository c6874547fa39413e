//! Device Telemetry Store
//!
//! Merges the device's periodic `key:value;` broadcasts into a map that
//! the poll surface renders.

use indexmap::IndexMap;
use std::sync::Arc;
use tello_bridge_shared::{codec, ports};
use tokio::net::UdpSocket;
use tokio::sync::RwLock;
use tracing::{error, info, trace};

/// Latest known telemetry values
///
/// Keys are never removed. A partial broadcast only overwrites the keys it
/// carries, everything else keeps its last known value.
pub struct TelemetryStore {
    fields: RwLock<IndexMap<String, String>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self {
            fields: RwLock::new(IndexMap::new()),
        }
    }

    /// Merge one raw broadcast, returning the number of fields applied
    pub async fn process_broadcast(&self, msg: &str) -> usize {
        let parsed = codec::parse_telemetry(msg);
        let count = parsed.len();

        let mut fields = self.fields.write().await;
        for (key, value) in parsed {
            fields.insert(key, value);
        }

        count
    }

    /// Get a single field
    #[cfg(test)]
    pub async fn get(&self, key: &str) -> Option<String> {
        self.fields.read().await.get(key).cloned()
    }

    /// Copy of all fields in first-seen order
    pub async fn snapshot(&self) -> IndexMap<String, String> {
        self.fields.read().await.clone()
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Receive telemetry broadcasts until the socket fails
pub async fn run_telemetry_reader(socket: UdpSocket, store: Arc<TelemetryStore>) {
    info!("[TELEMETRY] Reader started");
    let mut buf = vec![0u8; ports::MAX_DATAGRAM];

    loop {
        match socket.recv_from(&mut buf).await {
            Ok((n, _addr)) => {
                let msg = String::from_utf8_lossy(&buf[..n]);
                let applied = store.process_broadcast(&msg).await;
                trace!("[TELEMETRY] merged {} fields", applied);
            }
            Err(e) => {
                error!("[TELEMETRY] Receive failed, reader stopped: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_partial_broadcast_keeps_old_values() {
        let store = TelemetryStore::new();
        store.process_broadcast("bat:80;h:120").await;
        store.process_broadcast("bat:79").await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("bat").map(String::as_str), Some("79"));
        assert_eq!(snapshot.get("h").map(String::as_str), Some("120"));
    }

    #[tokio::test]
    async fn test_first_seen_order_is_kept() {
        let store = TelemetryStore::new();
        store.process_broadcast("pitch:0;roll:1;bat:50;").await;
        store.process_broadcast("bat:49;pitch:2").await;

        let keys: Vec<String> = store.snapshot().await.into_keys().collect();
        assert_eq!(keys, vec!["pitch", "roll", "bat"]);
    }

    #[tokio::test]
    async fn test_malformed_tokens_are_skipped() {
        let store = TelemetryStore::new();
        let applied = store.process_broadcast("bat:80;oops;h:1:2;tof:30").await;
        assert_eq!(applied, 2);
        assert_eq!(store.get("tof").await.as_deref(), Some("30"));
        assert_eq!(store.get("oops").await, None);
    }

    #[tokio::test]
    async fn test_reader_merges_datagrams() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let store = Arc::new(TelemetryStore::new());
        tokio::spawn(run_telemetry_reader(socket, store.clone()));

        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        device.send_to(b"bat:87;h:10;\r\n", addr).await.unwrap();

        for _ in 0..100 {
            if store.get("h").await.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.get("bat").await.as_deref(), Some("87"));
        assert_eq!(store.get("h").await.as_deref(), Some("10"));
    }
}
