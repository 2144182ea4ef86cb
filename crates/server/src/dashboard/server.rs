//! axum web server for the live dashboard.
//!
//! Routes: `/` (single-page dashboard), `/status` (JSON gauges), `/region`
//! (block snapshot of an axis-aligned box, the boundary a 3D viewer renders
//! from), and `/ws` (status pushes plus the world-change feed).

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use burrow_engine::world::position::BlockPos;

use super::{BlockView, ChangeBatchView, DashboardState};
use crate::event_bus::WorldChangeBatch;

struct AppState {
    dashboard: Arc<DashboardState>,
    bus: broadcast::Sender<WorldChangeBatch>,
}

/// Start the dashboard server; runs until the process exits.
pub async fn start(
    dashboard: Arc<DashboardState>,
    bus: broadcast::Sender<WorldChangeBatch>,
    port: u16,
) {
    let state = Arc::new(AppState { dashboard, bus });
    let app = Router::new()
        .route("/", get(index))
        .route("/status", get(status))
        .route("/region", get(region))
        .route("/ws", get(ws_upgrade))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Dashboard failed to bind {}: {}", addr, e);
            return;
        }
    };
    tracing::info!("Dashboard listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Dashboard server error: {}", e);
    }
}

async fn index() -> Html<&'static str> {
    Html(include_str!("index.html"))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard.status())
}

/// Bounds for `/region`, inclusive corners in any order, `x,y,z` each.
#[derive(Deserialize)]
struct RegionQuery {
    min: String,
    max: String,
}

async fn region(State(state): State<Arc<AppState>>, Query(query): Query<RegionQuery>) -> impl IntoResponse {
    let (Some(min), Some(max)) = (parse_pos(&query.min), parse_pos(&query.max)) else {
        return Json(serde_json::json!({
            "error": "min and max must be x,y,z integer triples"
        }));
    };
    let blocks: Vec<BlockView> = {
        let world = state.dashboard.world.read();
        world
            .blocks_in_region(min, max)
            .iter()
            .map(BlockView::of)
            .collect()
    };
    Json(serde_json::json!({ "blocks": blocks }))
}

fn parse_pos(text: &str) -> Option<BlockPos> {
    let mut parts = text.split(',').map(|part| part.trim().parse::<i64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(BlockPos::new(x, y, z))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Push status snapshots and world-change batches to one browser.
async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let mut changes = state.bus.subscribe();
    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let msg = serde_json::json!({ "type": "status", "data": state.dashboard.status() });
                if send_json(&mut socket, &msg).await.is_err() {
                    break;
                }
            }

            received = changes.recv() => {
                match received {
                    Ok(batch) => {
                        let msg = serde_json::json!({ "type": "changes", "data": ChangeBatchView::of(&batch) });
                        if send_json(&mut socket, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Dashboard socket lagged, skipped {} batches", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {} // pings and client chatter are ignored
                }
            }
        }
    }
}

async fn send_json(socket: &mut WebSocket, value: &serde_json::Value) -> Result<(), ()> {
    let text = value.to_string();
    socket.send(Message::Text(text.into())).await.map_err(|_| ())
}
