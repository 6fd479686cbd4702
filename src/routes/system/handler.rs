use axum::{
    Json,
    extract::{Request, State},
};

use super::model::{ClearRateLimitsResponse, HealthResponse};
use crate::{AppState, utils::now_iso};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: now_iso(),
    })
}

/// 清空所有客户端的限流计数，不经过限流中间件
pub async fn clear_rate_limits(
    State(state): State<AppState>,
    req: Request,
) -> Json<ClearRateLimitsResponse> {
    let ip = state.rate_limiter.client_id(&req);
    let previous_count = state.rate_limiter.store().clear_all(&ip);

    tracing::info!(
        "Rate limit cache cleared by IP: {} (was at {} requests)",
        ip,
        previous_count
    );

    Json(ClearRateLimitsResponse {
        message: "Rate limit cache cleared".to_string(),
        previous_count,
        timestamp: now_iso(),
    })
}
