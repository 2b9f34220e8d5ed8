//! 测试辅助：可编排的内存行情数据源 (仅在 `test-utils` feature 下编译)。

use crate::market::entity::{RawFinancialRecord, RawMasterRecord, RawPriceRecord};
use crate::market::error::MarketError;
use crate::market::port::MarketDataProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// # Summary
/// 预置响应的 `MarketDataProvider` 实现，并记录每一次调用。
///
/// # Invariants
/// - 未预置的数据一律返回空列表。
/// - 预置的失败状态码 429 映射为 `RateLimited`，其余映射为 `Http`。
#[derive(Default)]
pub struct MockMarketData {
    master: Mutex<Vec<RawMasterRecord>>,
    master_failure: Mutex<Option<u16>>,
    bars_by_date: DashMap<NaiveDate, Vec<RawPriceRecord>>,
    bars_failures: DashMap<NaiveDate, u16>,
    bars_by_code: DashMap<String, Vec<RawPriceRecord>>,
    financials: DashMap<String, Vec<RawFinancialRecord>>,
    financial_failures: DashMap<String, u16>,
    master_calls: AtomicUsize,
    date_requests: Mutex<Vec<NaiveDate>>,
    range_requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    financial_requests: Mutex<Vec<String>>,
}

fn status_error(status: u16) -> MarketError {
    if status == 429 {
        MarketError::RateLimited
    } else {
        MarketError::Http {
            status,
            message: format!("mock failure {}", status),
        }
    }
}

fn locked<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_master(self, rows: Vec<RawMasterRecord>) -> Self {
        *locked(&self.master) = rows;
        self
    }

    pub fn with_bars_on(self, date: NaiveDate, rows: Vec<RawPriceRecord>) -> Self {
        self.bars_by_date.insert(date, rows);
        self
    }

    pub fn with_bars_for(self, code: &str, rows: Vec<RawPriceRecord>) -> Self {
        self.bars_by_code.insert(code.to_string(), rows);
        self
    }

    pub fn with_financials(self, code: &str, rows: Vec<RawFinancialRecord>) -> Self {
        self.financials.insert(code.to_string(), rows);
        self
    }

    pub fn fail_master_with(self, status: u16) -> Self {
        *locked(&self.master_failure) = Some(status);
        self
    }

    pub fn fail_bars_on(self, date: NaiveDate, status: u16) -> Self {
        self.bars_failures.insert(date, status);
        self
    }

    pub fn fail_financials_with(self, code: &str, status: u16) -> Self {
        self.financial_failures.insert(code.to_string(), status);
        self
    }

    /// 主数据接口被调用的次数
    pub fn master_calls(&self) -> usize {
        self.master_calls.load(Ordering::SeqCst)
    }

    /// 按日期查询日线的请求序列
    pub fn date_requests(&self) -> Vec<NaiveDate> {
        locked(&self.date_requests).clone()
    }

    /// 按区间查询日线的请求序列
    pub fn range_requests(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        locked(&self.range_requests).clone()
    }

    /// 财务摘要的请求序列
    pub fn financial_requests(&self) -> Vec<String> {
        locked(&self.financial_requests).clone()
    }
}

#[async_trait]
impl MarketDataProvider for MockMarketData {
    async fn fetch_master(&self) -> Result<Vec<RawMasterRecord>, MarketError> {
        self.master_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *locked(&self.master_failure) {
            return Err(status_error(status));
        }
        Ok(locked(&self.master).clone())
    }

    async fn fetch_daily_bars_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, MarketError> {
        locked(&self.date_requests).push(date);
        if let Some(status) = self.bars_failures.get(&date) {
            return Err(status_error(*status));
        }
        Ok(self
            .bars_by_date
            .get(&date)
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn fetch_daily_bars_between(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, MarketError> {
        locked(&self.range_requests).push((code.to_string(), from, to));
        Ok(self
            .bars_by_code
            .get(code)
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn fetch_financial_summaries(
        &self,
        code: &str,
    ) -> Result<Vec<RawFinancialRecord>, MarketError> {
        locked(&self.financial_requests).push(code.to_string());
        if let Some(status) = self.financial_failures.get(code) {
            return Err(status_error(*status));
        }
        Ok(self
            .financials
            .get(code)
            .map(|v| v.clone())
            .unwrap_or_default())
    }
}
