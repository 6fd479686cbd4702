// 进程内缓存
// 价格缓存与速率限制计数都只存在于本进程内，重启即丢失

pub mod models;
pub mod operations;

pub use models::{CachedPrice, DisplayPrice, RateLimitEntry};
pub use operations::{Admission, PriceCache, RateLimitStore};
