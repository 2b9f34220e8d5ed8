use crate::financial::FinancialFetcher;
use crate::metrics::{derive_payload, screening_universe};
use crate::pacing::Pacer;
use crate::price::{PriceResolver, index_prices};
use crate::settings::ScreeningSettings;
use kabuka_core::common::time::TimeProvider;
use kabuka_core::market::entity::ScreeningPayload;
use kabuka_core::market::error::MarketError;
use kabuka_core::market::port::MarketDataProvider;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// # Summary
/// 筛选聚合管线：主数据 → 最近交易日价格 → 财务摘要 → 指标推导。
///
/// # Invariants
/// - 只有主数据获取失败会使整轮失败；价格与财务的缺失都降级为 `null` 字段。
/// - 各阶段严格顺序执行。
pub struct ScreeningPipeline {
    provider: Arc<dyn MarketDataProvider>,
    prices: PriceResolver,
    financials: FinancialFetcher,
    settings: ScreeningSettings,
}

impl ScreeningPipeline {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        settings: ScreeningSettings,
    ) -> Self {
        let pacer = Pacer::new(settings.request_interval, settings.rate_limit_cooldown);
        Self {
            prices: PriceResolver::new(
                Arc::clone(&provider),
                clock,
                settings.price_lookback_days,
            ),
            financials: FinancialFetcher::new(
                Arc::clone(&provider),
                pacer,
                settings.financial_cap,
            ),
            provider,
            settings,
        }
    }

    /// # Summary
    /// 执行一轮完整的聚合。
    ///
    /// # Logic
    /// 1. 获取主数据，失败直接返回错误。
    /// 2. 过滤目标市场区分。
    /// 3. 回溯获取最近交易日日线并建立价格索引。
    /// 4. 截取宇宙前 `universe_cap` 只证券，再对其中前 `financial_cap` 只获取财务摘要。
    /// 5. 合并并推导指标。
    ///
    /// # Returns
    /// 聚合载荷，或主数据获取错误。
    pub async fn run(&self) -> Result<ScreeningPayload, MarketError> {
        let started = Instant::now();

        let master = self.provider.fetch_master().await?;
        info!("listed issues: {}", master.len());

        let universe = screening_universe(&master, &self.settings);
        let universe_size = universe.len();
        let universe_codes: Vec<String> = universe
            .into_iter()
            .take(self.settings.universe_cap)
            .map(|m| m.code.clone())
            .collect();
        info!(
            "screening universe (markets {:?}): {} ({} screened)",
            self.settings.accepted_markets,
            universe_size,
            universe_codes.len()
        );

        let bars = self.prices.resolve().await;
        let price_index = index_prices(&bars);

        let financials = self.financials.fetch_latest(&universe_codes).await;

        let payload = derive_payload(&master, &price_index, &financials, &self.settings);
        let with_per = payload.stocks.iter().filter(|s| s.per.is_some()).count();
        info!(
            "screening payload: {} stocks ({} with PER) in {:?}",
            payload.stocks.len(),
            with_per,
            started.elapsed()
        );
        Ok(payload)
    }
}
