//! Mock Tello for exercising the bridge without hardware
//!
//! Usage: cargo run -p mock-device
//! Then start the bridge with `--device 127.0.0.1:18889 --skip-handshake`
//! (or keep the handshake; the mock answers it).

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tello_bridge_shared::{codec, timing, verbs};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Simulated Tello command and telemetry endpoints")]
struct Args {
    /// Address the mock listens on for commands
    #[arg(long, default_value = "127.0.0.1:18889")]
    listen: String,

    /// Where telemetry is broadcast to
    #[arg(long, default_value = "127.0.0.1:8890")]
    telemetry_to: SocketAddr,

    /// Delay before each reply
    #[arg(long, default_value_t = 200)]
    reply_delay_ms: u64,
}

/// Simulated flight state
#[derive(Debug)]
struct DeviceState {
    battery: u32,
    height_cm: i32,
    flying: bool,
}

impl DeviceState {
    fn new() -> Self {
        Self {
            battery: 100,
            height_cm: 0,
            flying: false,
        }
    }

    /// Apply a command, returning the reply (None for rc)
    fn handle(&mut self, cmd: &str) -> Option<String> {
        let mut words = cmd.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let arg: i32 = words.next().and_then(|w| w.parse().ok()).unwrap_or(0);

        if codec::is_query(verb) {
            return Some(match verb {
                "battery?" => self.battery.to_string(),
                "height?" => format!("{}dm", self.height_cm / 10),
                _ => "0".to_string(),
            });
        }

        match verb {
            "rc" => return None,
            "takeoff" => {
                self.flying = true;
                self.height_cm = 80;
            }
            "land" | "emergency" => {
                self.flying = false;
                self.height_cm = 0;
            }
            "up" if self.flying => self.height_cm += arg,
            "down" if self.flying => self.height_cm = (self.height_cm - arg).max(0),
            "up" | "down" => return Some("error Not flying".into()),
            _ => {}
        }

        Some(verbs::SUCCESS_MARKER.to_string())
    }

    fn telemetry(&self) -> String {
        let bat = self.battery.to_string();
        let h = self.height_cm.to_string();
        codec::format_telemetry([
            ("pitch", "0"),
            ("roll", "0"),
            ("yaw", "0"),
            ("h", h.as_str()),
            ("bat", bat.as_str()),
        ])
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();
    let socket = Arc::new(UdpSocket::bind(&args.listen).await?);
    let state = Arc::new(Mutex::new(DeviceState::new()));
    info!("Mock device listening on {}", args.listen);
    info!("Telemetry to {}", args.telemetry_to);

    // Telemetry broadcast
    let telemetry_socket = UdpSocket::bind("0.0.0.0:0").await?;
    let telemetry_state = state.clone();
    let telemetry_to = args.telemetry_to;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(timing::TELEMETRY_INTERVAL_MS));
        let mut ticks: u64 = 0;
        loop {
            ticker.tick().await;
            ticks += 1;
            let msg = {
                let mut device = telemetry_state.lock().await;
                // lose 1% battery every 10 seconds
                if ticks % 100 == 0 && device.battery > 0 {
                    device.battery -= 1;
                }
                device.telemetry()
            };
            if let Err(e) = telemetry_socket.send_to(msg.as_bytes(), telemetry_to).await {
                warn!("Telemetry send failed: {}", e);
            }
        }
    });

    let reply_delay = Duration::from_millis(args.reply_delay_ms);
    let mut buf = vec![0u8; 1518];

    loop {
        let (n, peer) = socket.recv_from(&mut buf).await?;
        let cmd = String::from_utf8_lossy(&buf[..n]).trim().to_string();
        debug!("RX from {}: {}", peer, cmd);

        let reply = state.lock().await.handle(&cmd);
        if let Some(reply) = reply {
            let socket = socket.clone();
            tokio::spawn(async move {
                tokio::time::sleep(reply_delay).await;
                info!("{} -> {}", cmd, reply);
                if let Err(e) = socket.send_to(reply.as_bytes(), peer).await {
                    warn!("Reply to {} failed: {}", peer, e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_reply_ok() {
        let mut device = DeviceState::new();
        assert_eq!(device.handle("command").as_deref(), Some("ok"));
        assert_eq!(device.handle("takeoff").as_deref(), Some("ok"));
        assert!(device.flying);
        assert_eq!(device.handle("up 40").as_deref(), Some("ok"));
        assert_eq!(device.height_cm, 120);
    }

    #[test]
    fn test_queries_and_rc() {
        let mut device = DeviceState::new();
        assert_eq!(device.handle("battery?").as_deref(), Some("100"));
        assert_eq!(device.handle("rc 0 0 0 0"), None);
        assert_eq!(device.handle("up 20").as_deref(), Some("error Not flying"));
    }

    #[test]
    fn test_telemetry_parses() {
        let device = DeviceState::new();
        let fields = codec::parse_telemetry(&device.telemetry());
        assert!(fields.contains(&("bat".to_string(), "100".to_string())));
        assert_eq!(fields.len(), 5);
    }
}
