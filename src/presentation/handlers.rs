// HTTP request handlers
use crate::domain::range::TimeRange;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List the selectable time ranges
pub async fn list_ranges() -> Json<Vec<&'static str>> {
    Json(TimeRange::ALL.iter().map(|r| r.name()).collect())
}

/// One chart frame for the requested time range
pub async fn get_chart(
    Path(range): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(range) = TimeRange::from_name(&range) else {
        return (StatusCode::BAD_REQUEST, "unknown time range").into_response();
    };
    Json(state.chart_service.render_now(range)).into_response()
}

/// Stream chart frames for a time range on the render tick cadence
pub async fn stream_chart(
    Path(range): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let Some(range) = TimeRange::from_name(&range) else {
        return (StatusCode::BAD_REQUEST, "unknown time range").into_response();
    };

    // Check if the client accepts Brotli compression
    let compress = headers
        .get("accept-encoding")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.contains("br"))
        .unwrap_or(false);

    let rx = state.chart_service.stream_frames(range);
    stream_from_receiver(rx, compress).await.into_response()
}
