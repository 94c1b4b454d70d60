use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use tower_http::cors::CorsLayer;

use crate::engine::Phase;
use crate::hub::{BroadcastHub, ClientMessage};
use crate::model::MoveEvent;
use crate::scheduler::SchedulerHandle;
use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub hub: Arc<BroadcastHub>,
    pub scheduler: SchedulerHandle,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/ws", get(ws_upgrade))
        .route("/api/moves", get(current_moves))
        .route("/api/refresh", post(request_refresh))
        .route("/api/status", get(status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn current_moves(State(state): State<AppState>) -> Json<Vec<MoveEvent>> {
    Json(state.store.snapshot())
}

async fn request_refresh(State(state): State<AppState>) -> StatusCode {
    if state.scheduler.refresh() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

#[derive(serde::Serialize)]
struct StatusOut {
    phase: Phase,
    subscribers: usize,
    stored: usize,
    capacity: usize,
    cycles: u64,
}

async fn status(State(state): State<AppState>) -> Json<StatusOut> {
    Json(StatusOut {
        phase: state.scheduler.phase(),
        subscribers: state.hub.subscriber_count(),
        stored: state.store.len(),
        capacity: state.store.capacity(),
        cycles: state.scheduler.cycles_completed(),
    })
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One subscriber connection: hub queue -> socket, socket -> refresh requests.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let sub = state.hub.subscribe();
    let id = sub.id;
    let mut rx = sub.rx;
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::warn!(target: "hub", error = %e, "serialize frame");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break; // client went away
            }
        }
    });

    let scheduler = state.scheduler.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::RequestRefresh) => {
                        tracing::info!(target: "hub", subscriber = id, "refresh requested");
                        scheduler.refresh();
                    }
                    Err(_) => tracing::debug!(target: "hub", subscriber = id, "ignoring client frame"),
                },
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    tracing::debug!(target: "hub", subscriber = id, error = %e, "socket error");
                    break;
                }
                _ => {} // ping/pong/binary
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    state.hub.unsubscribe(id);
}
