use std::sync::Arc;

use cache::{PriceCache, RateLimitStore};
use config::Config;
use infrastructure::{CoinGeckoSource, PriceFetcher, QuoteSource};
use middleware::RateLimiter;
use simulator::PriceSimulator;

pub mod cache;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod simulator;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub prices: Arc<PriceCache>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// 使用 CoinGecko 作为报价源
    pub fn from_config(config: Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        let source = Arc::new(CoinGeckoSource::new(client, &config));
        Ok(Self::new(config, source, PriceSimulator::new()))
    }

    pub fn new(config: Config, source: Arc<dyn QuoteSource>, simulator: PriceSimulator) -> Self {
        let prices = PriceCache::new(
            PriceFetcher::new(source),
            simulator,
            config.price_cache_ttl(),
        );
        let store = RateLimitStore::new(config.rate_limit_window(), config.rate_limit_requests);
        let rate_limiter = RateLimiter::new(Arc::new(store), &config);

        Self {
            config,
            prices: Arc::new(prices),
            rate_limiter: Arc::new(rate_limiter),
        }
    }
}
