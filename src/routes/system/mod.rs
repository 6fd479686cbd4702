mod handler;
mod model;

pub use handler::{clear_rate_limits, health};
pub use model::{ClearRateLimitsResponse, HealthResponse};
