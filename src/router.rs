use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::get,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::{
    AppState,
    config::Config,
    middleware::{log_errors, rate_limit},
    routes,
};

pub const CLEAR_RATE_LIMITS_PATH: &str = "/api/clear-rate-limits";

// 只允许配置中的来源
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_credentials(true)
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    // 需要限流的路由
    let limited_routes = Router::new()
        .route("/api/eth-price", get(routes::price::get_eth_price))
        .route("/health", get(routes::system::health))
        .route_layer(axum::middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit,
        ));

    // 管理路由不经过限流
    let admin_routes =
        Router::new().route(CLEAR_RATE_LIMITS_PATH, get(routes::system::clear_rate_limits));

    Router::new()
        .merge(limited_routes)
        .merge(admin_routes)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&state.config))
                .layer(axum::middleware::from_fn(log_errors)),
        )
        .with_state(state)
}
