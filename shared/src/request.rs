//! Client request model
//!
//! Scratch encodes everything in the request path:
//! ```text
//! /poll                          read state
//! /reset_all                     emergency override
//! /<nonblocking-verb>/<param>..  fire-and-forget
//! /<verb>/<id>/<param>..         blocking or local action
//! ```

use std::fmt;
use thiserror::Error;

use crate::verbs;

/// Errors produced while parsing a client request
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Empty request path")]
    EmptyPath,

    #[error("Missing command id for '{0}'")]
    MissingId(String),

    #[error("Invalid command id '{id}' for '{verb}'")]
    InvalidId { verb: String, id: String },

    #[error("Local action '{0}' needs a non-negative id")]
    NegativeLocalId(String),
}

/// How the executor handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Sent to the device, reply awaited
    Blocking,
    /// Sent to the device, no reply awaited
    Nonblocking,
    /// Handled in-process, never reaches the device
    LocalAction,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Blocking => write!(f, "blocking"),
            CommandKind::Nonblocking => write!(f, "nonblocking"),
            CommandKind::LocalAction => write!(f, "local"),
        }
    }
}

/// A command waiting in the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Client id; negative for nonblocking commands
    pub id: i64,
    pub kind: CommandKind,
    /// Verb followed by space-joined arguments
    pub payload: String,
}

impl CommandRequest {
    /// Create a blocking device command
    pub fn blocking(id: i64, payload: impl Into<String>) -> Self {
        Self {
            id,
            kind: CommandKind::Blocking,
            payload: payload.into(),
        }
    }

    /// Create a fire-and-forget device command
    pub fn nonblocking(payload: impl Into<String>) -> Self {
        Self {
            id: verbs::NONBLOCKING_ID,
            kind: CommandKind::Nonblocking,
            payload: payload.into(),
        }
    }

    /// Create a command handled inside the bridge
    pub fn local_action(id: i64, payload: impl Into<String>) -> Self {
        Self {
            id,
            kind: CommandKind::LocalAction,
            payload: payload.into(),
        }
    }

    /// The emergency override queued by `reset_all`
    pub fn reset() -> Self {
        Self::blocking(verbs::RESET_ID, verbs::RESET_COMMAND)
    }

    /// Whether the client can correlate this request (shows up as busy)
    pub fn is_tracked(&self) -> bool {
        self.id >= 0
    }

    /// First word of the payload
    pub fn verb(&self) -> &str {
        self.payload.split(' ').next().unwrap_or_default()
    }

    /// Words after the verb
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.payload.split(' ').skip(1)
    }
}

/// A parsed HTTP request from the polling client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    Poll,
    ResetAll,
    Submit(CommandRequest),
}

/// Parse a request path such as `/forward/5/50`
pub fn parse_request_path(path: &str) -> Result<ClientRequest, ProtocolError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let verb = match segments.first() {
        Some(verb) => *verb,
        None => return Err(ProtocolError::EmptyPath),
    };

    match verb {
        "poll" => return Ok(ClientRequest::Poll),
        "reset_all" => return Ok(ClientRequest::ResetAll),
        _ => {}
    }

    if verbs::NONBLOCKING_VERBS.contains(&verb) {
        return Ok(ClientRequest::Submit(CommandRequest::nonblocking(
            segments.join(" "),
        )));
    }

    let raw_id = segments
        .get(1)
        .ok_or_else(|| ProtocolError::MissingId(verb.to_string()))?;
    let id: i64 = raw_id.parse().map_err(|_| ProtocolError::InvalidId {
        verb: verb.to_string(),
        id: raw_id.to_string(),
    })?;

    let mut payload = verb.to_string();
    for param in &segments[2..] {
        payload.push(' ');
        payload.push_str(param);
    }

    let request = if verbs::LOCAL_ACTION_VERBS.contains(&verb) {
        if id < 0 {
            return Err(ProtocolError::NegativeLocalId(verb.to_string()));
        }
        CommandRequest::local_action(id, payload)
    } else if id < 0 {
        CommandRequest::nonblocking(payload)
    } else {
        CommandRequest::blocking(id, payload)
    };

    Ok(ClientRequest::Submit(request))
}
