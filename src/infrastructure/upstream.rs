use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::config::Config;
use crate::error::UpstreamError;

/// 外部报价源
pub trait QuoteSource: Send + Sync {
    fn fetch_quote(&self) -> BoxFuture<'_, Result<f64, UpstreamError>>;
}

/// CoinGecko `simple/price` 接口
pub struct CoinGeckoSource {
    client: reqwest::Client,
    url: String,
    api_key_header: String,
    api_key: String,
    asset_id: String,
    vs_currency: String,
}

// 返回格式：{ "ethereum": { "usd": 3000.12 } }
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

impl CoinGeckoSource {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            url: config.upstream_url.clone(),
            api_key_header: config.upstream_api_key_header.clone(),
            api_key: config.upstream_api_key.clone(),
            asset_id: config.upstream_asset_id.clone(),
            vs_currency: config.upstream_vs_currency.clone(),
        }
    }

    async fn request_quote(&self) -> Result<f64, UpstreamError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ids", self.asset_id.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
            ])
            .header(self.api_key_header.as_str(), self.api_key.as_str())
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status(response.status()));
        }

        let body: SimplePriceResponse = response.json().await.map_err(UpstreamError::Decode)?;
        let price = body
            .get(&self.asset_id)
            .and_then(|quotes| quotes.get(&self.vs_currency))
            .copied()
            .ok_or_else(|| UpstreamError::MissingQuote {
                asset: self.asset_id.clone(),
                currency: self.vs_currency.clone(),
            })?;

        if !price.is_finite() || price <= 0.0 {
            return Err(UpstreamError::InvalidPrice(price));
        }

        tracing::info!("Fetched current {} price: ${}", self.asset_id, price);
        Ok(price)
    }
}

impl QuoteSource for CoinGeckoSource {
    fn fetch_quote(&self) -> BoxFuture<'_, Result<f64, UpstreamError>> {
        Box::pin(self.request_quote())
    }
}

/// 单次请求上游，失败时退回到缓存中的旧价格
#[derive(Clone)]
pub struct PriceFetcher {
    source: Arc<dyn QuoteSource>,
}

impl PriceFetcher {
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self { source }
    }

    /// `fallback` 为缓存中当前的价格（无论是否过期）
    pub async fn fetch_real_price(&self, fallback: Option<f64>) -> Result<f64, UpstreamError> {
        match self.source.fetch_quote().await {
            Ok(price) => Ok(price),
            Err(e) => match fallback {
                Some(cached) => {
                    tracing::warn!("Upstream quote failed ({}), using cached price {}", e, cached);
                    Ok(cached)
                }
                None => {
                    tracing::error!("Upstream quote failed with no cached price: {}", e);
                    Err(e)
                }
            },
        }
    }
}
