use crate::chart::ChartShaper;
use crate::pipeline::ScreeningPipeline;
use crate::ranking::rankings;
use crate::settings::ScreeningSettings;
use kabuka_cache::ttl::TtlCache;
use kabuka_core::common::ChartPeriod;
use kabuka_core::common::time::TimeProvider;
use kabuka_core::market::entity::{FinancialPoint, PricePoint, Rankings, ScreeningPayload};
use kabuka_core::market::error::MarketError;
use kabuka_core::market::port::MarketDataProvider;
use std::sync::Arc;

/// # Summary
/// HTTP 层持有的筛选服务门面。
///
/// # Invariants
/// - 筛选载荷经 TTL 缓存，TTL 内的请求共享同一份 `Arc`。
/// - 图表与财务趋势始终直连上游。
pub struct ScreeningService {
    pipeline: ScreeningPipeline,
    charts: ChartShaper,
    cache: TtlCache<ScreeningPayload>,
}

impl ScreeningService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        clock: Arc<dyn TimeProvider>,
        settings: ScreeningSettings,
    ) -> Self {
        let cache = TtlCache::new(settings.cache_ttl, Arc::clone(&clock));
        Self {
            charts: ChartShaper::new(Arc::clone(&provider), Arc::clone(&clock)),
            pipeline: ScreeningPipeline::new(provider, clock, settings),
            cache,
        }
    }

    /// 返回缓存的筛选载荷，过期或为空时重新聚合。
    pub async fn screening(&self) -> Result<Arc<ScreeningPayload>, MarketError> {
        self.cache.get_or_refresh(|| self.pipeline.run()).await
    }

    /// 无视 TTL 强制重新聚合。
    pub async fn refresh(&self) -> Result<Arc<ScreeningPayload>, MarketError> {
        self.cache.force_refresh(|| self.pipeline.run()).await
    }

    pub async fn rankings(&self) -> Result<Rankings, MarketError> {
        let payload = self.screening().await?;
        Ok(rankings(&payload.stocks))
    }

    pub async fn price_chart(
        &self,
        code: &str,
        period: ChartPeriod,
    ) -> Result<Vec<PricePoint>, MarketError> {
        self.charts.price_series(code, period).await
    }

    pub async fn financial_trend(&self, code: &str) -> Result<Vec<FinancialPoint>, MarketError> {
        self.charts.financial_series(code).await
    }

    /// 当前是否持有新鲜的载荷
    pub fn is_cached(&self) -> bool {
        self.cache.fresh().is_some()
    }
}
