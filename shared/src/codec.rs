//! Text codec for device datagrams and the poll response
//!
//! Telemetry broadcasts are `;`-separated `key:value` tokens:
//! ```text
//! pitch:0;roll:0;yaw:0;bat:87;h:0;
//! ```
//!
//! The poll body is newline separated:
//! ```text
//! x0 120
//! y0 96
//! nf0 1
//! bat 87
//! _busy 3 5
//! ```

use std::fmt::Write;

use crate::verbs;

/// Latest result of one detection source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub x: i32,
    pub y: i32,
    pub area: i32,
    /// Number of targets found in the last frame
    pub found: u32,
}

impl Detection {
    /// Result for a frame with nothing in it
    pub const NONE: Detection = Detection {
        x: -1,
        y: -1,
        area: -1,
        found: 0,
    };
}

impl Default for Detection {
    fn default() -> Self {
        Self::NONE
    }
}

/// Decode a reply datagram into text, line ending and all
pub fn decode_reply(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Split a telemetry broadcast into key/value pairs
///
/// Malformed tokens are skipped; the rest of the broadcast is kept.
pub fn parse_telemetry(msg: &str) -> Vec<(String, String)> {
    msg.split(';')
        .filter_map(|token| {
            let mut parts = token.trim().split(':');
            let key = parts.next()?;
            let value = parts.next()?;
            if parts.next().is_some() || key.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Format key/value pairs as a telemetry broadcast
pub fn format_telemetry<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut msg = String::new();
    for (key, value) in fields {
        let _ = write!(msg, "{}:{};", key, value);
    }
    msg.push_str("\r\n");
    msg
}

/// Whether a command payload asks the device for a value
pub fn is_query(payload: &str) -> bool {
    payload.ends_with('?')
}

/// Whether `reply` can be taken as the answer to `payload`
///
/// Queries accept any non-empty reply; everything else waits for the
/// success marker.
pub fn accepts_reply(payload: &str, reply: &str) -> bool {
    if is_query(payload) {
        !reply.is_empty()
    } else {
        reply.starts_with(verbs::SUCCESS_MARKER)
    }
}

/// Render the body returned by `/poll`
pub fn render_poll_body<'a>(
    detections: &[Detection],
    telemetry: impl IntoIterator<Item = (&'a str, &'a str)>,
    backlog: &[i64],
) -> String {
    let mut body = String::new();

    for (i, det) in detections.iter().enumerate() {
        let _ = write!(body, "x{} {}\ny{} {}\n", i, det.x, i, det.y);
        let _ = writeln!(body, "nf{} {}", i, det.found);
    }

    for (key, value) in telemetry {
        let _ = writeln!(body, "{} {}", key, value);
    }

    body.push_str("_busy");
    for id in backlog {
        let _ = write!(body, " {}", id);
    }
    body.push('\n');

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_telemetry() {
        let fields = parse_telemetry("bat:80;h:120");
        assert_eq!(
            fields,
            vec![
                ("bat".to_string(), "80".to_string()),
                ("h".to_string(), "120".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_telemetry_skips_malformed_tokens() {
        let fields = parse_telemetry("bat:80;garbage;a:b:c;:5;tof:10;\r\n");
        assert_eq!(
            fields,
            vec![
                ("bat".to_string(), "80".to_string()),
                ("tof".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn test_format_telemetry_parses_back() {
        let msg = format_telemetry([("bat", "87"), ("h", "0")]);
        assert_eq!(msg, "bat:87;h:0;\r\n");
        assert_eq!(parse_telemetry(&msg).len(), 2);
    }

    #[test]
    fn test_accepts_reply() {
        assert!(accepts_reply("takeoff", "ok"));
        assert!(!accepts_reply("takeoff", "error"));
        assert!(!accepts_reply("takeoff", ""));
        assert!(accepts_reply("battery?", "87"));
        assert!(accepts_reply("battery?", "error"));
        assert!(!accepts_reply("battery?", ""));
    }

    #[test]
    fn test_decode_reply_is_verbatim() {
        assert_eq!(decode_reply(b"ok\r\n"), "ok\r\n");
        assert_eq!(decode_reply(b"87\r\n"), "87\r\n");
        assert_eq!(decode_reply(b"87"), "87");
    }

    #[test]
    fn test_whitespace_only_query_reply_is_accepted() {
        let reply = decode_reply(b"\r\n");
        assert!(accepts_reply("battery?", &reply));
        assert!(!accepts_reply("takeoff", &reply));
        assert!(accepts_reply("takeoff", &decode_reply(b"ok\r\n")));
    }

    #[test]
    fn test_render_poll_body() {
        let detections = [Detection {
            x: 120,
            y: 96,
            area: 400,
            found: 2,
        }];
        let body = render_poll_body(&detections, [("bat", "87"), ("h", "10")], &[3, 5]);
        assert_eq!(body, "x0 120\ny0 96\nnf0 2\nbat 87\nh 10\n_busy 3 5\n");
    }

    #[test]
    fn test_render_poll_body_empty() {
        let body = render_poll_body(&[], std::iter::empty(), &[]);
        assert_eq!(body, "_busy\n");
    }
}
