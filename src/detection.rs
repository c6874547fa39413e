//! Detection result store
//!
//! Written by the vision pipeline, read by the poll surface.

use tello_bridge_shared::Detection;
use tokio::sync::RwLock;

/// Latest detection per source; a source appears when it first reports
pub struct DetectionStore {
    sources: RwLock<Vec<Detection>>,
}

impl DetectionStore {
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// Record the latest result of source `index`
    ///
    /// Entry point for an external vision pipeline; the bridge itself never writes here.
    #[allow(dead_code)]
    pub async fn update(&self, index: usize, detection: Detection) {
        let mut sources = self.sources.write().await;
        if sources.len() <= index {
            sources.resize(index + 1, Detection::NONE);
        }
        sources[index] = detection;
    }

    pub async fn snapshot(&self) -> Vec<Detection> {
        self.sources.read().await.clone()
    }
}

impl Default for DetectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sources_appear_on_update() {
        let store = DetectionStore::new();
        assert!(store.snapshot().await.is_empty());

        let hit = Detection {
            x: 10,
            y: 20,
            area: 300,
            found: 1,
        };
        store.update(1, hit).await;

        assert_eq!(store.snapshot().await, vec![Detection::NONE, hit]);
    }
}
