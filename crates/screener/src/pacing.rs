use std::time::Duration;
use tracing::debug;

/// # Summary
/// 顺序请求的节拍器。调用方每完成一次请求就调用一次 `pace`，
/// 遇到上游限流时调用 `cool_down`。
///
/// # Invariants
/// - 只服务于单个顺序循环；不做并发许可管理。
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    interval: Duration,
    cooldown: Duration,
}

impl Pacer {
    pub fn new(interval: Duration, cooldown: Duration) -> Self {
        Self { interval, cooldown }
    }

    /// 请求之间的固定间隔
    pub async fn pace(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }

    /// 限流后的冷却
    pub async fn cool_down(&self) {
        debug!("rate limited, cooling down for {:?}", self.cooldown);
        tokio::time::sleep(self.cooldown).await;
    }
}
