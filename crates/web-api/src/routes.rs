use axum::{
    extract::{ws::WebSocketUpgrade, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain::PresenceView;

use crate::handshake::{connection_metadata, ConnectQuery};
use crate::state::AppState;
use crate::ws_connection::WebSocketConnection;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    online_connections: usize,
    subscribers: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/presence", get(presence))
        .route("/presence/refresh", post(refresh_presence))
        .route("/stats", get(stats))
        .route("/ws", get(websocket_upgrade))
}

/// 根据配置的来源列表构建 CORS 层；包含 `*` 时允许任意来源
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "忽略无效的 CORS 来源");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn presence(State(state): State<AppState>) -> Json<Vec<PresenceView>> {
    Json(state.hub.presence_snapshot().await)
}

async fn refresh_presence(State(state): State<AppState>) -> StatusCode {
    state.hub.request_presence_refresh().await;
    StatusCode::ACCEPTED
}

async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        online_connections: state.hub.online_count().await,
        subscribers: state.publisher.subscriber_count(),
    })
}

async fn websocket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let metadata = connection_metadata(query, &headers);
    ws.on_upgrade(move |socket| WebSocketConnection::new(socket, state, metadata).run())
}
