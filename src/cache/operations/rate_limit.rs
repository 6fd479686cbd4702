use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::cache::models::rate_limit::RateLimitEntry;

/// 限流判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// 放行，附带当前窗口内的计数
    Allowed { count: u32 },
    /// 拒绝，距窗口结束还有多久
    Rejected { retry_after: Duration },
}

/// 固定窗口限流计数
pub struct RateLimitStore {
    entries: DashMap<String, RateLimitEntry>,
    window: Duration,
    max_requests: u32,
}

impl RateLimitStore {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            entries: DashMap::new(),
            window,
            max_requests,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn admit(&self, client: &str) -> Admission {
        self.admit_at(client, Instant::now())
    }

    /// 判定与计数在同一把分片锁内完成
    pub fn admit_at(&self, client: &str, now: Instant) -> Admission {
        let fresh = RateLimitEntry {
            count: 1,
            reset_at: now + self.window,
        };

        match self.entries.entry(client.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                Admission::Allowed { count: 1 }
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if now > entry.reset_at {
                    *entry = fresh;
                    Admission::Allowed { count: 1 }
                } else if entry.count >= self.max_requests {
                    Admission::Rejected {
                        retry_after: entry.reset_at.saturating_duration_since(now),
                    }
                } else {
                    entry.count += 1;
                    Admission::Allowed { count: entry.count }
                }
            }
        }
    }

    pub fn count(&self, client: &str) -> u32 {
        self.entries.get(client).map(|entry| entry.count).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空所有客户端的计数，返回调用者清空前的计数
    pub fn clear_all(&self, client: &str) -> u32 {
        let previous = self.count(client);
        self.entries.clear();
        previous
    }

    /// 删除窗口结束已超过 `grace` 的条目
    pub fn sweep_at(&self, now: Instant, grace: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.reset_at) <= grace);
        before.saturating_sub(self.entries.len())
    }

    /// 后台定期清理不再活跃的客户端
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration, grace: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // 第一次 tick 立即返回
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.sweep_at(Instant::now(), grace);
                if removed > 0 {
                    tracing::debug!(
                        "Swept {} expired rate limit entries, {} remaining",
                        removed,
                        self.entries.len()
                    );
                }
            }
        })
    }
}
