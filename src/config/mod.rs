use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_UPSTREAM_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:8000,http://127.0.0.1:8000";

// 时间类配置的上限，避免 `Instant + Duration` 溢出
const MAX_WINDOW_SECS: u64 = 24 * 60 * 60;
const MAX_CACHE_TTL_MS: u64 = 60 * 60 * 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Missing(#[from] env::VarError),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("{} is outside {}..={}", value, min, max),
        })
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub upstream_url: String,
    pub upstream_api_key: String,
    pub upstream_api_key_header: String,
    pub upstream_asset_id: String,
    pub upstream_vs_currency: String,
    pub price_cache_ttl_ms: u64,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub rate_limit_sweep_interval_secs: u64,
    pub rate_limit_sweep_grace_secs: u64,
    pub trust_proxy_headers: bool,
}

// 解析失败时使用默认值
fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn string_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let cors_origins = string_var_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let config = Config {
            server_host: string_var_or("SERVER_HOST", "0.0.0.0"),
            server_port: var_or("SERVER_PORT", 3001),
            cors_origins,
            upstream_url: string_var_or("UPSTREAM_URL", DEFAULT_UPSTREAM_URL),
            upstream_api_key: env::var("UPSTREAM_API_KEY")?,
            upstream_api_key_header: string_var_or("UPSTREAM_API_KEY_HEADER", "x-cg-demo-api-key"),
            upstream_asset_id: string_var_or("UPSTREAM_ASSET_ID", "ethereum"),
            upstream_vs_currency: string_var_or("UPSTREAM_VS_CURRENCY", "usd"),
            price_cache_ttl_ms: var_or("PRICE_CACHE_TTL_MS", 6000),
            rate_limit_window_secs: var_or("RATE_LIMIT_WINDOW", 60),
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", 10),
            rate_limit_sweep_interval_secs: var_or("RATE_LIMIT_SWEEP_INTERVAL", 60),
            rate_limit_sweep_grace_secs: var_or("RATE_LIMIT_SWEEP_GRACE", 60),
            trust_proxy_headers: var_or("TRUST_PROXY_HEADERS", false),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range(
            "RATE_LIMIT_REQUESTS",
            u64::from(self.rate_limit_requests),
            1,
            u64::from(u32::MAX),
        )?;
        check_range("RATE_LIMIT_WINDOW", self.rate_limit_window_secs, 1, MAX_WINDOW_SECS)?;
        check_range("PRICE_CACHE_TTL_MS", self.price_cache_ttl_ms, 1, MAX_CACHE_TTL_MS)?;
        // tokio::time::interval 不接受零周期
        check_range(
            "RATE_LIMIT_SWEEP_INTERVAL",
            self.rate_limit_sweep_interval_secs,
            1,
            MAX_WINDOW_SECS,
        )?;
        check_range(
            "RATE_LIMIT_SWEEP_GRACE",
            self.rate_limit_sweep_grace_secs,
            0,
            MAX_WINDOW_SECS,
        )?;
        Ok(())
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_millis(self.price_cache_ttl_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_interval_secs)
    }

    pub fn rate_limit_sweep_grace(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_grace_secs)
    }
}

impl Default for Config {
    /// 与 `from_env` 相同的默认值，API key 为空
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 3001,
            cors_origins: DEFAULT_CORS_ORIGINS
                .split(',')
                .map(String::from)
                .collect(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            upstream_api_key: String::new(),
            upstream_api_key_header: "x-cg-demo-api-key".to_string(),
            upstream_asset_id: "ethereum".to_string(),
            upstream_vs_currency: "usd".to_string(),
            price_cache_ttl_ms: 6000,
            rate_limit_window_secs: 60,
            rate_limit_requests: 10,
            rate_limit_sweep_interval_secs: 60,
            rate_limit_sweep_grace_secs: 60,
            trust_proxy_headers: false,
        }
    }
}
