use serde::{Deserialize, Serialize};

/// 健康检查响应
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// 清空限流计数响应
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRateLimitsResponse {
    pub message: String,
    /// 调用者清空前的计数
    pub previous_count: u32,
    pub timestamp: String,
}
