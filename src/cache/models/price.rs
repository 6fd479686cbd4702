use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::utils::iso_timestamp;

/// 价格缓存条目，要么完整存在，要么不存在
#[derive(Debug, Clone)]
pub struct CachedPrice {
    pub price: f64,
    pub last_updated: DateTime<Utc>,
    pub up: bool,
    pub expiry: Instant,
}

impl CachedPrice {
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expiry
    }

    pub fn display(&self) -> DisplayPrice {
        DisplayPrice {
            price: self.price,
            last_updated: iso_timestamp(self.last_updated),
            up: self.up,
        }
    }
}

/// 返回给客户端的价格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayPrice {
    pub price: f64,
    pub last_updated: String,
    pub up: bool,
}
