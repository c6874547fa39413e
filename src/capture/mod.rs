//! Capture Module
//!
//! Hands "save the current frame" requests from the command executor to
//! the frame producer and records the raw video stream that serves them.

mod recorder;
mod rendezvous;

pub use recorder::{CaptureConfig, StreamRecorder};
pub use rendezvous::CaptureRendezvous;
