//! HTTP server for the Scratch extension (Axum)
//!
//! Every request is a GET whose path carries the whole command. The raw
//! path-and-query string is parsed, since query verbs such as `battery?`
//! put a `?` in the middle of the path.

use crate::command::CommandQueue;
use crate::poll::PollFacade;
use crate::state::BridgeState;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tello_bridge_shared::request::{parse_request_path, ClientRequest};
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct ApiState {
    pub queue: Arc<CommandQueue>,
    pub poll: Arc<PollFacade>,
}

impl ApiState {
    pub fn new(state: &BridgeState) -> Self {
        Self {
            queue: state.queue.clone(),
            poll: Arc::new(state.poll_facade()),
        }
    }
}

/// Create the HTTP router
pub fn create_http_server(state: ApiState) -> Router {
    Router::new()
        .route("/poll", get(poll))
        .route("/reset_all", get(reset_all))
        .route("/*path", get(handle_request))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn poll(State(state): State<ApiState>) -> String {
    state.poll.poll().await.render()
}

async fn reset_all(State(state): State<ApiState>) -> StatusCode {
    state.poll.reset_all().await;
    StatusCode::OK
}

async fn handle_request(State(state): State<ApiState>, uri: Uri) -> Response {
    let raw = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    match parse_request_path(raw) {
        Ok(ClientRequest::Poll) => poll(State(state)).await.into_response(),
        Ok(ClientRequest::ResetAll) => reset_all(State(state)).await.into_response(),
        Ok(ClientRequest::Submit(request)) => {
            let payload = request.payload.clone();
            if state.queue.submit(request).await {
                debug!("Queued '{}'", payload);
            }
            StatusCode::OK.into_response()
        }
        Err(e) => {
            warn!("Rejected request {}: {}", raw, e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn get_path(app: &Router, path: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_command_paths_are_queued() {
        let state = BridgeState::new();
        let app = create_http_server(ApiState::new(&state));

        assert_eq!(get_path(&app, "/takeoff/1").await.0, StatusCode::OK);
        assert_eq!(get_path(&app, "/forward/2/50").await.0, StatusCode::OK);
        assert_eq!(get_path(&app, "/forward/2/50").await.0, StatusCode::OK);
        assert_eq!(get_path(&app, "/rc/0/0/0/0").await.0, StatusCode::OK);
        assert_eq!(get_path(&app, "/battery?/3").await.0, StatusCode::OK);

        assert_eq!(state.queue.len().await, 4);
        assert_eq!(state.queue.backlog_ids().await, vec![1, 2, 3]);

        let mut payloads = Vec::new();
        while !state.queue.is_empty().await {
            let head = state.queue.dequeue_front().await;
            payloads.push(head.request.payload.clone());
            state.queue.complete(head.ticket).await;
        }
        assert_eq!(payloads, vec!["takeoff", "forward 50", "rc 0 0 0 0", "battery?"]);
    }

    #[tokio::test]
    async fn test_poll_body() {
        let state = BridgeState::new();
        state.telemetry.process_broadcast("bat:87;h:0;").await;
        let app = create_http_server(ApiState::new(&state));

        get_path(&app, "/land/4").await;
        let (status, body) = get_path(&app, "/poll").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "bat 87\nh 0\n_busy 4\n");
    }

    #[tokio::test]
    async fn test_reset_all() {
        let state = BridgeState::new();
        let app = create_http_server(ApiState::new(&state));

        get_path(&app, "/takeoff/1").await;
        get_path(&app, "/up/2/50").await;
        let (status, _) = get_path(&app, "/reset_all").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.queue.backlog_ids().await, vec![0]);
    }

    #[tokio::test]
    async fn test_bad_request() {
        let state = BridgeState::new();
        let app = create_http_server(ApiState::new(&state));

        let (status, body) = get_path(&app, "/takeoff/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("takeoff"));
        assert!(state.queue.is_empty().await);
    }
}
