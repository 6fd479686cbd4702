use tokio::time::Instant;

/// 单个客户端在当前窗口内的请求计数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}
