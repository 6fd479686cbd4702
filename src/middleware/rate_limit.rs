use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::{
    cache::{Admission, RateLimitStore},
    config::Config,
    error::AppError,
};

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<RateLimitStore>,
    trust_proxy_headers: bool,
}

impl RateLimiter {
    pub fn new(store: Arc<RateLimitStore>, config: &Config) -> Self {
        Self {
            store,
            trust_proxy_headers: config.trust_proxy_headers,
        }
    }

    pub fn store(&self) -> &Arc<RateLimitStore> {
        &self.store
    }

    /// 客户端标识：默认取连接地址，开启 `trust_proxy_headers` 后优先取代理头
    pub fn client_id<B>(&self, req: &Request<B>) -> String {
        let remote_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string());

        let forwarded = if self.trust_proxy_headers {
            req.headers()
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .or_else(|| {
                    req.headers()
                        .get("x-forwarded-for")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
                })
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        } else {
            None
        };

        forwarded
            .or(remote_ip.as_deref())
            .unwrap_or("unknown")
            .to_string()
    }

    pub async fn check_rate_limit(
        self: Arc<Self>,
        req: Request<Body>,
        next: Next,
    ) -> Result<Response, AppError> {
        let ip = self.client_id(&req);

        match self.store.admit(&ip) {
            Admission::Allowed { count } => {
                tracing::debug!(
                    "Request from {} admitted ({}/{})",
                    ip,
                    count,
                    self.store.max_requests()
                );
                Ok(next.run(req).await)
            }
            Admission::Rejected { retry_after } => {
                tracing::warn!(
                    "Rate limit exceeded for IP: {}. Count: {}/{}",
                    ip,
                    self.store.count(&ip),
                    self.store.max_requests()
                );
                Err(AppError::RateLimitExceeded {
                    limit: self.store.max_requests(),
                    window_secs: self.store.window().as_secs(),
                    // 向上取整，至少 1 秒
                    retry_after_secs: retry_after.as_secs_f64().ceil().max(1.0) as u64,
                })
            }
        }
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    limiter.check_rate_limit(req, next).await
}
