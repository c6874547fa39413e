//! Capture Rendezvous
//!
//! One-slot handshake between the command executor and the frame producer.
//! The executor posts a filename and waits; the producer writes the frame
//! and clears the slot.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::timeout;

/// A pending "save the current frame" request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub filename: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Capture already pending for {0}")]
    Busy(String),

    #[error("Capture of {filename} not serviced within {ceiling:?}")]
    TimedOut { filename: String, ceiling: Duration },
}

/// Holds at most one outstanding capture request
pub struct CaptureRendezvous {
    slot: watch::Sender<Option<CaptureRequest>>,
}

impl CaptureRendezvous {
    pub fn new() -> Self {
        let (slot, _rx) = watch::channel(None);
        Self { slot }
    }

    /// Post a request and wait until the producer has serviced it
    ///
    /// With `ceiling` set, an unserviced request is withdrawn when the
    /// ceiling expires. With `None` the wait is unbounded.
    pub async fn request(
        &self,
        filename: &str,
        ceiling: Option<Duration>,
    ) -> Result<(), CaptureError> {
        let request = CaptureRequest {
            filename: filename.to_string(),
        };
        let mut rx = self.slot.subscribe();

        let mut busy = None;
        self.slot.send_if_modified(|slot| match slot {
            Some(existing) => {
                busy = Some(existing.filename.clone());
                false
            }
            None => {
                *slot = Some(request.clone());
                true
            }
        });
        if let Some(existing) = busy {
            return Err(CaptureError::Busy(existing));
        }

        let serviced = rx.wait_for(|slot| slot.as_ref() != Some(&request));

        match ceiling {
            None => {
                let _ = serviced.await;
                Ok(())
            }
            Some(ceiling) => {
                if timeout(ceiling, serviced).await.is_ok() {
                    return Ok(());
                }
                self.clear_matching(&request);
                Err(CaptureError::TimedOut {
                    filename: request.filename,
                    ceiling,
                })
            }
        }
    }

    /// Outstanding request, if any
    #[cfg(test)]
    pub fn pending(&self) -> Option<CaptureRequest> {
        self.slot.borrow().clone()
    }

    /// Wait until a request is posted
    pub async fn next_request(&self) -> Option<CaptureRequest> {
        let mut rx = self.slot.subscribe();
        let posted = rx.wait_for(Option::is_some).await.ok()?;
        posted.clone()
    }

    /// Mark `request` as serviced, releasing the waiting executor
    ///
    /// Returns false if the request was already withdrawn.
    pub fn complete(&self, request: &CaptureRequest) -> bool {
        self.clear_matching(request)
    }

    fn clear_matching(&self, request: &CaptureRequest) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.as_ref() == Some(request) {
                *slot = None;
                true
            } else {
                false
            }
        })
    }
}

impl Default for CaptureRendezvous {
    fn default() -> Self {
        Self::new()
    }
}
