use std::net::{IpAddr, SocketAddr};

use price_backend::{AppState, config::Config, router::create_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env()
        .expect("Failed to load configuration (check UPSTREAM_API_KEY and limits)");
    tracing::info!("Allowed CORS origins: {:?}", config.cors_origins);

    let state = AppState::from_config(config.clone()).expect("Failed to build HTTP client");

    // 定期清理不活跃客户端的限流计数
    let _sweeper = state.rate_limiter.store().clone().spawn_sweeper(
        config.rate_limit_sweep_interval(),
        config.rate_limit_sweep_grace(),
    );

    let app = create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("ETH price server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
