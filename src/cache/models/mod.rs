/// 缓存数据模型
pub mod price;
pub mod rate_limit;

pub use price::{CachedPrice, DisplayPrice};
pub use rate_limit::RateLimitEntry;
