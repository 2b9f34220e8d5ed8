use crate::pacing::Pacer;
use kabuka_core::market::entity::RawFinancialRecord;
use kabuka_core::market::port::MarketDataProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// # Summary
/// 财务摘要获取器：对受限数量的证券逐只请求，并保留每个序列的最后一期。
///
/// # Invariants
/// - 严格顺序执行，通过 `Pacer` 控制请求节奏；不得并行化。
/// - 429：冷却后跳过该证券，本轮不重试。
/// - 其他单只错误：记录日志后继续。
/// - 任何单只失败都不会使整轮失败。
pub struct FinancialFetcher {
    provider: Arc<dyn MarketDataProvider>,
    pacer: Pacer,
    cap: usize,
}

impl FinancialFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, pacer: Pacer, cap: usize) -> Self {
        Self {
            provider,
            pacer,
            cap,
        }
    }

    /// # Summary
    /// 获取前 `cap` 只证券的最新财务摘要。
    ///
    /// # Logic
    /// 1. 截取代码列表前 `cap` 个。
    /// 2. 逐只请求；成功后按固定间隔等待。
    /// 3. 非空序列保留最后一个元素作为“最新”。
    ///
    /// # Arguments
    /// * `codes`: 上游原始代码列表，按优先级排列。
    ///
    /// # Returns
    /// 原始代码到最新财务摘要的映射，仅包含成功且非空的证券。
    pub async fn fetch_latest(&self, codes: &[String]) -> HashMap<String, RawFinancialRecord> {
        let targets = &codes[..codes.len().min(self.cap)];
        info!("fetching financial summaries for {} symbols", targets.len());

        let mut latest = HashMap::with_capacity(targets.len());
        for code in targets {
            match self.provider.fetch_financial_summaries(code).await {
                Ok(rows) => {
                    if let Some(last) = rows.into_iter().last() {
                        latest.insert(code.clone(), last);
                    } else {
                        debug!("{}: no financial summaries", code);
                    }
                    self.pacer.pace().await;
                }
                Err(e) if e.is_rate_limited() => {
                    warn!("{}: rate limited, cooling down before next symbol", code);
                    self.pacer.cool_down().await;
                }
                Err(e) => {
                    warn!("{}: financial summary fetch failed: {}", code, e);
                }
            }
        }

        info!("financial summaries: {} symbols enriched", latest.len());
        latest
    }
}
