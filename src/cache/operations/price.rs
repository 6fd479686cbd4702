use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::cache::models::price::{CachedPrice, DisplayPrice};
use crate::error::UpstreamError;
use crate::infrastructure::PriceFetcher;
use crate::simulator::PriceSimulator;

/// 价格缓存操作
///
/// 持有唯一的价格条目。过期后第一个请求负责刷新，
/// 同时到达的其他请求等待刷新完成后直接读取新值。
pub struct PriceCache {
    entry: RwLock<Option<CachedPrice>>,
    refresh: Mutex<()>,
    fetcher: PriceFetcher,
    simulator: PriceSimulator,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(fetcher: PriceFetcher, simulator: PriceSimulator, ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            refresh: Mutex::new(()),
            fetcher,
            simulator,
            ttl,
        }
    }

    /// 读取当前条目，不触发刷新
    pub async fn peek(&self) -> Option<CachedPrice> {
        self.entry.read().await.clone()
    }

    pub async fn get_display_price(&self) -> Result<DisplayPrice, UpstreamError> {
        self.get_display_price_at(Instant::now()).await
    }

    pub async fn get_display_price_at(&self, now: Instant) -> Result<DisplayPrice, UpstreamError> {
        if let Some(display) = self.fresh_at(now).await {
            return Ok(display);
        }

        let _guard = self.refresh.lock().await;

        // 等锁期间可能已被其他请求刷新
        if let Some(display) = self.fresh_at(now).await {
            tracing::debug!("Price refreshed by a concurrent request");
            return Ok(display);
        }

        let fallback = self.entry.read().await.as_ref().map(|cached| cached.price);
        let base_price = self.fetcher.fetch_real_price(fallback).await?;
        let simulated = self.simulator.simulate(base_price).await;

        // 有效期从写入时刻算起，不受上游延迟影响
        let written_at = Instant::now().max(now);
        let cached = CachedPrice {
            price: simulated.price,
            last_updated: Utc::now(),
            up: simulated.up,
            expiry: written_at + self.ttl,
        };
        let shown = cached.display();
        *self.entry.write().await = Some(cached);

        tracing::info!(
            "Price cache refreshed: {} ({})",
            simulated.price,
            if simulated.up { "up" } else { "down" }
        );
        Ok(shown)
    }

    async fn fresh_at(&self, now: Instant) -> Option<DisplayPrice> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.is_fresh_at(now))
            .map(CachedPrice::display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::upstream::tests::ScriptedSource;
    use std::sync::Arc;

    const TTL: Duration = Duration::from_millis(6000);

    fn cache_with(source: Arc<ScriptedSource>) -> PriceCache {
        PriceCache::new(PriceFetcher::new(source), PriceSimulator::with_seed(1), TTL)
    }

    fn within_two_percent(price: f64, base: f64) -> bool {
        (price - base).abs() <= base * 0.02 + 0.005
    }

    #[tokio::test]
    async fn starts_empty() {
        let cache = cache_with(Arc::new(ScriptedSource::new(vec![Some(3000.0)])));
        assert!(cache.peek().await.is_none());
    }

    #[tokio::test]
    async fn hit_within_window_returns_same_price() {
        let source = Arc::new(ScriptedSource::new(vec![Some(3000.0), Some(4000.0)]));
        let cache = cache_with(source.clone());
        let start = Instant::now();

        let first = cache.get_display_price_at(start).await.unwrap();
        let second = cache
            .get_display_price_at(start + Duration::from_millis(3000))
            .await
            .unwrap();
        let third = cache
            .get_display_price_at(start + Duration::from_millis(5999))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
        assert_eq!(source.calls(), 1);
        assert!(within_two_percent(first.price, 3000.0));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let source = Arc::new(ScriptedSource::new(vec![Some(3000.0), Some(4000.0)]));
        let cache = cache_with(source.clone());
        let start = Instant::now();

        cache.get_display_price_at(start).await.unwrap();
        let cached = cache.peek().await.unwrap();
        assert_eq!(cached.expiry, start + TTL);

        let refreshed = cache.get_display_price_at(start + TTL).await.unwrap();
        assert_eq!(source.calls(), 2);
        assert!(within_two_percent(refreshed.price, 4000.0));
        assert_eq!(refreshed.up, refreshed.price > 4000.0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_price_is_used_when_upstream_fails() {
        let source = Arc::new(ScriptedSource::new(vec![Some(3000.0), None]));
        let cache = cache_with(source.clone());
        let start = Instant::now();

        let first = cache.get_display_price_at(start).await.unwrap();
        let second = cache.get_display_price_at(start + TTL).await.unwrap();

        // 同一种子重放：第二次抽样应以缓存价格为基准，而不是 3000
        let replay = PriceSimulator::with_seed(1);
        assert_eq!(replay.simulate(3000.0).await.price, first.price);
        let expected = replay.simulate(first.price).await;

        assert_eq!(source.calls(), 2);
        assert_eq!(second.price, expected.price);
        assert_eq!(second.up, expected.up);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_upstream_does_not_shorten_validity() {
        let source = Arc::new(ScriptedSource::with_delay(
            vec![Some(3000.0), Some(4000.0)],
            Duration::from_secs(2),
        ));
        let cache = cache_with(source.clone());

        let first = cache.get_display_price().await.unwrap();
        let written_at = Instant::now();
        assert_eq!(cache.peek().await.unwrap().expiry, written_at + TTL);

        tokio::time::sleep(Duration::from_secs(5)).await;
        let second = cache.get_display_price().await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn cold_failure_leaves_cache_empty() {
        let source = Arc::new(ScriptedSource::new(vec![None, Some(3000.0)]));
        let cache = cache_with(source.clone());
        let start = Instant::now();

        assert!(cache.get_display_price_at(start).await.is_err());
        assert!(cache.peek().await.is_none());

        let recovered = cache.get_display_price_at(start).await.unwrap();
        assert!(within_two_percent(recovered.price, 3000.0));
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_fetch() {
        let source = Arc::new(ScriptedSource::with_delay(
            vec![Some(3000.0)],
            Duration::from_millis(50),
        ));
        let cache = Arc::new(cache_with(source.clone()));
        let now = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get_display_price_at(now).await })
            })
            .collect();

        let mut prices = Vec::new();
        for handle in handles {
            prices.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(source.calls(), 1);
        assert!(prices.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[tokio::test]
    async fn last_updated_is_iso8601_millis() {
        let cache = cache_with(Arc::new(ScriptedSource::new(vec![Some(3000.0)])));
        let display = cache.get_display_price().await.unwrap();

        assert!(display.last_updated.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&display.last_updated).is_ok());
        // 2026-01-01T00:00:00.000Z
        assert_eq!(display.last_updated.len(), 24);
    }
}
