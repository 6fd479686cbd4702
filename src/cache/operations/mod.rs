/// 缓存操作
// 价格缓存
pub mod price;

// 速率限制计数
pub mod rate_limit;

pub use price::PriceCache;
pub use rate_limit::{Admission, RateLimitStore};
