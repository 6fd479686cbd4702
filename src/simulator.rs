//! 在真实报价基础上模拟价格波动

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

/// 单次刷新允许的最大波动（百分比）
pub const MAX_CHANGE_PERCENT: f64 = 2.0;

/// 模拟价格下限，保证结果为正
pub const MIN_PRICE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedPrice {
    pub price: f64,
    pub up: bool,
}

/// 按给定百分比调整价格，保留两位小数
pub fn apply_change(base_price: f64, change_percent: f64) -> SimulatedPrice {
    let raw = base_price * (1.0 + change_percent / 100.0);
    let price = ((raw * 100.0).round() / 100.0).max(MIN_PRICE);

    SimulatedPrice {
        price,
        up: price > base_price,
    }
}

pub struct PriceSimulator {
    rng: Mutex<StdRng>,
}

impl PriceSimulator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// 每次缓存刷新都要重新抽样，不能复用上一次结果
    pub async fn simulate(&self, base_price: f64) -> SimulatedPrice {
        let change_percent = self
            .rng
            .lock()
            .await
            .random_range(-MAX_CHANGE_PERCENT..=MAX_CHANGE_PERCENT);
        let simulated = apply_change(base_price, change_percent);

        tracing::debug!(
            "Simulated {:+.3}% change: {} -> {}",
            change_percent,
            base_price,
            simulated.price
        );
        simulated
    }
}

impl Default for PriceSimulator {
    fn default() -> Self {
        Self::new()
    }
}
