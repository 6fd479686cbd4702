use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 上游报价源错误
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to decode upstream response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("upstream response has no {asset}/{currency} quote")]
    MissingQuote { asset: String, currency: String },
    #[error("upstream returned invalid price {0}")]
    InvalidPrice(f64),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("rate limit exceeded: max {limit} requests per {window_secs}s")]
    RateLimitExceeded {
        limit: u32,
        window_secs: u64,
        retry_after_secs: u64,
    },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateLimitExceeded {
                limit,
                window_secs,
                retry_after_secs,
            } => {
                let per = if window_secs == 60 {
                    "minute".to_string()
                } else {
                    format!("{} seconds", window_secs)
                };
                let body = Json(ErrorResponse {
                    error: format!("Rate limit exceeded. Max {} requests per {}.", limit, per),
                });
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            // 不向客户端暴露上游细节
            AppError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
                .into_response(),
        }
    }
}
