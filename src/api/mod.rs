//! Request-ingestion surface
//!
//! Turns Scratch's GET paths into queue submissions, poll reads and resets.
//! Never talks to the device itself.

mod server;

pub use server::{create_http_server, ApiState};
