use crate::resolve::{finite, positive};
use chrono::Days;
use kabuka_core::common::time::TimeProvider;
use kabuka_core::market::entity::RawPriceRecord;
use kabuka_core::market::port::MarketDataProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// # Summary
/// 最近交易日解析器：从“昨天”开始逐日回溯，找到第一个已发布日线的交易日。
///
/// # Invariants
/// - 最多尝试 `lookback_days` 次 (偏移 1..=lookback_days)。
/// - 窗口内全部为空不是错误，返回空列表。
/// - 单日请求失败按空处理并继续回溯。
pub struct PriceResolver {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
    lookback_days: u32,
}

impl PriceResolver {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        lookback_days: u32,
    ) -> Self {
        Self {
            provider,
            clock,
            lookback_days,
        }
    }

    /// # Summary
    /// 获取回溯窗口内最近一个非空交易日的全市场日线。
    ///
    /// # Logic
    /// 1. 以时钟给出的今天为基准，偏移 1..=N 天。
    /// 2. 第一个非空响应即返回。
    ///
    /// # Returns
    /// 日线列表，可能为空。
    pub async fn resolve(&self) -> Vec<RawPriceRecord> {
        let today = self.clock.today();
        for offset in 1..=self.lookback_days {
            let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) else {
                break;
            };
            match self.provider.fetch_daily_bars_on(date).await {
                Ok(bars) if !bars.is_empty() => {
                    info!("daily bars: {} rows ({})", bars.len(), date.format("%Y%m%d"));
                    return bars;
                }
                Ok(_) => debug!("no daily bars on {}", date),
                Err(e) => warn!("daily bars on {} failed: {}", date, e),
            }
        }
        info!(
            "no daily bars found within {} days, prices unavailable this cycle",
            self.lookback_days
        );
        Vec::new()
    }
}

/// # Summary
/// 构建 “上游代码 → 价格” 索引。
///
/// # Logic
/// 1. 复权收盘价优先，其次原始收盘价；非正值视为缺失。
/// 2. 同一代码出现多次时后者覆盖前者。
pub fn index_prices(bars: &[RawPriceRecord]) -> HashMap<String, f64> {
    let mut index = HashMap::with_capacity(bars.len());
    for bar in bars {
        let price = positive(bar.adjusted_close.and_then(finite))
            .or_else(|| positive(bar.close.and_then(finite)));
        if let Some(p) = price {
            index.insert(bar.code.clone(), p);
        }
    }
    index
}
