use crate::market::entity::{RawFinancialRecord, RawMasterRecord, RawPriceRecord};
use crate::market::error::MarketError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// # Summary
/// 上游市场数据提供者接口 (原始数据源)。
///
/// # Invariants
/// - 实现者不做自动重试，重试/冷却策略由调用方按端点决定。
/// - HTTP 429 必须以 `MarketError::RateLimited` 返回。
/// - 每次请求都必须携带上游凭证。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取全部上市证券主数据。
    ///
    /// # Returns
    /// 成功返回主数据列表，失败返回 MarketError。
    async fn fetch_master(&self) -> Result<Vec<RawMasterRecord>, MarketError>;

    /// # Summary
    /// 获取指定交易日的全市场日线。
    ///
    /// # Arguments
    /// * `date`: 交易日。
    ///
    /// # Returns
    /// 非交易日或数据尚未发布时返回空列表。
    async fn fetch_daily_bars_on(&self, date: NaiveDate)
    -> Result<Vec<RawPriceRecord>, MarketError>;

    /// # Summary
    /// 获取单只证券在闭区间 `[from, to]` 内的日线。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    /// * `from`: 开始日期。
    /// * `to`: 结束日期。
    ///
    /// # Returns
    /// 成功返回日线列表 (顺序由上游决定)。
    async fn fetch_daily_bars_between(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, MarketError>;

    /// # Summary
    /// 获取单只证券的全部财务摘要。
    ///
    /// # Arguments
    /// * `code`: 证券代码。
    ///
    /// # Returns
    /// 成功返回财务摘要序列，数组顺序即上游发布顺序。
    async fn fetch_financial_summaries(
        &self,
        code: &str,
    ) -> Result<Vec<RawFinancialRecord>, MarketError>;
}
