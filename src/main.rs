mod api;
mod capture;
mod command;
mod detection;
mod device;
mod poll;
mod state;
mod transport;

use api::{create_http_server, ApiState};
use capture::{CaptureConfig, StreamRecorder};
use clap::Parser;
use command::{CommandExecutor, ExecutorConfig};
use device::{run_reply_reader, run_telemetry_reader, DeviceConfig};
use state::BridgeState;
use std::sync::Arc;
use std::time::Duration;
use tello_bridge_shared::{ports, timing, CommandRequest};
use tokio::net::{TcpListener, UdpSocket};
use tokio::task::JoinSet;
use transport::UdpDeviceLink;

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Commands run once before the queue opens
const HANDSHAKE: &[&str] = &["command", "streamon"];

#[derive(Parser, Debug)]
#[command(about = "Bridges a Scratch polling client to a Tello over UDP")]
struct Args {
    /// Device command address
    #[arg(long, default_value = ports::DEVICE_ADDR)]
    device: String,

    /// Local bind of the command/reply socket
    #[arg(long, default_value = ports::REPLY_BIND)]
    reply_bind: String,

    /// Local bind of the telemetry socket
    #[arg(long, default_value = ports::TELEMETRY_BIND)]
    telemetry_bind: String,

    /// Local bind of the video stream socket
    #[arg(long, default_value = ports::VIDEO_BIND)]
    video_bind: String,

    /// HTTP port for the Scratch extension
    #[arg(long, default_value_t = ports::HTTP_PORT)]
    http_port: u16,

    /// Reply ceiling for blocking commands
    #[arg(long, default_value_t = timing::REPLY_TIMEOUT_MS)]
    reply_timeout_ms: u64,

    /// Capture ceiling; 0 waits for the frame producer forever
    #[arg(long, default_value_t = timing::CAPTURE_TIMEOUT_MS)]
    capture_timeout_ms: u64,

    /// Do not record the video stream (captures will fail)
    #[arg(long)]
    no_video: bool,

    /// Skip the "command" / "streamon" handshake
    #[arg(long)]
    skip_handshake: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let device_config = DeviceConfig {
        device_addr: args.device.clone(),
        reply_bind: args.reply_bind.clone(),
        telemetry_bind: args.telemetry_bind.clone(),
    };
    let capture_timeout =
        (args.capture_timeout_ms > 0).then(|| Duration::from_millis(args.capture_timeout_ms));
    let executor_config = ExecutorConfig {
        reply_timeout: Duration::from_millis(args.reply_timeout_ms),
        capture_timeout,
        ..Default::default()
    };
    let capture_config = CaptureConfig {
        video_bind: args.video_bind.clone(),
        ..Default::default()
    };

    info!("Bridge starting, device at {}", device_config.device_addr);

    let state = BridgeState::new();
    let mut tasks = JoinSet::new();

    // Device sockets
    let link = UdpDeviceLink::bind(&device_config.reply_bind, &device_config.device_addr).await?;
    let telemetry_socket = UdpSocket::bind(&device_config.telemetry_bind).await?;
    info!("  Replies on {}", device_config.reply_bind);
    info!("  Telemetry on {}", device_config.telemetry_bind);

    tasks.spawn(run_reply_reader(link.socket(), state.responses.clone()));
    tasks.spawn(run_telemetry_reader(telemetry_socket, state.telemetry.clone()));

    let executor = Arc::new(CommandExecutor::new(
        Arc::new(link),
        state.queue.clone(),
        state.responses.clone(),
        state.capture.clone(),
        executor_config,
    ));

    if !args.skip_handshake {
        for payload in HANDSHAKE {
            let result = executor.execute(&CommandRequest::blocking(0, *payload)).await;
            info!("Handshake '{}': {}", payload, result);
        }
    }

    let executor_clone = executor.clone();
    tasks.spawn(async move {
        executor_clone.run().await;
    });

    // Frame producer for captures
    if args.no_video {
        warn!("Video disabled, capture commands will not be serviced");
    } else {
        match StreamRecorder::bind(&capture_config, state.capture.clone()).await {
            Ok(recorder) => {
                info!("  Video stream on {}", capture_config.video_bind);
                tasks.spawn(recorder.run());
            }
            Err(e) => {
                error!("Cannot open video stream on {}: {}", capture_config.video_bind, e);
            }
        }
    }

    // Scratch-facing HTTP surface
    let listener = TcpListener::bind(("0.0.0.0", args.http_port)).await?;
    let app = create_http_server(ApiState::new(&state));
    info!("HTTP listening on :{}", args.http_port);
    tasks.spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("HTTP server stopped: {}", e);
        }
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    tasks.shutdown().await;

    Ok(())
}
