use chrono::{Days, NaiveDate};
use kabuka_core::common::ChartPeriod;
use kabuka_core::common::time::TimeProvider;
use kabuka_core::market::entity::{
    FinancialPoint, PricePoint, RawFinancialRecord, RawNumber, RawPriceRecord,
};
use kabuka_core::market::error::MarketError;
use kabuka_core::market::port::MarketDataProvider;
use std::sync::Arc;
use tracing::info;

/// 财务趋势视图保留的年度数
pub const FINANCIAL_TREND_YEARS: usize = 5;

/// # Summary
/// 计算图表查询窗口 `[today - days, today]`。
pub fn chart_window(today: NaiveDate, period: ChartPeriod) -> (NaiveDate, NaiveDate) {
    let days = u64::try_from(period.days()).unwrap_or_default();
    let from = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);
    (from, today)
}

/// # Summary
/// 将日线整形为图表点并按日期字符串升序排列。
pub fn shape_price_series(rows: Vec<RawPriceRecord>) -> Vec<PricePoint> {
    let mut points: Vec<PricePoint> = rows
        .into_iter()
        .map(|row| PricePoint {
            adjusted_close: row.effective_close(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// # Summary
/// 将财务摘要整形为年度业绩点。
///
/// # Logic
/// 1. 仅保留带会计年度标签的行。
/// 2. 按会计年度升序排序 (稳定排序)，取最后 5 行。
/// 3. 数值无法解析时填 0，仅用于绘图。
pub fn shape_financial_series(rows: Vec<RawFinancialRecord>) -> Vec<FinancialPoint> {
    let mut labelled: Vec<(String, RawFinancialRecord)> = rows
        .into_iter()
        .filter_map(|row| match row.fiscal_year.clone() {
            Some(fy) if !fy.is_empty() => Some((fy, row)),
            _ => None,
        })
        .collect();
    labelled.sort_by(|a, b| a.0.cmp(&b.0));

    let skip = labelled.len().saturating_sub(FINANCIAL_TREND_YEARS);
    let zero_fill =
        |v: &Option<RawNumber>| v.as_ref().and_then(RawNumber::value).unwrap_or(0.0);

    labelled
        .into_iter()
        .skip(skip)
        .map(|(fiscal_year, row)| FinancialPoint {
            fiscal_year,
            revenue: zero_fill(&row.revenue),
            operating_income: zero_fill(&row.operating_income),
            ordinary_income: zero_fill(&row.ordinary_income),
            net_income: zero_fill(&row.net_income),
        })
        .collect()
}

/// # Summary
/// 单只证券的图表数据整形器，始终实时请求上游，不经过缓存。
pub struct ChartShaper {
    provider: Arc<dyn MarketDataProvider>,
    clock: Arc<dyn TimeProvider>,
}

impl ChartShaper {
    pub fn new(provider: Arc<dyn MarketDataProvider>, clock: Arc<dyn TimeProvider>) -> Self {
        Self { provider, clock }
    }

    /// # Summary
    /// 获取指定周期的价格序列。
    ///
    /// # Arguments
    /// * `code`: 证券代码 (直接透传给上游)。
    /// * `period`: 图表周期。
    ///
    /// # Returns
    /// 升序的价格点，或上游错误。
    pub async fn price_series(
        &self,
        code: &str,
        period: ChartPeriod,
    ) -> Result<Vec<PricePoint>, MarketError> {
        let (from, to) = chart_window(self.clock.today(), period);
        info!("chart data: {} ({}: {} ~ {})", code, period, from, to);

        let rows = self
            .provider
            .fetch_daily_bars_between(code, from, to)
            .await?;
        let points = shape_price_series(rows);
        info!("chart data: {} points", points.len());
        Ok(points)
    }

    /// # Summary
    /// 获取最近 5 个会计年度的业绩序列。
    pub async fn financial_series(&self, code: &str) -> Result<Vec<FinancialPoint>, MarketError> {
        let rows = self.provider.fetch_financial_summaries(code).await?;
        let points = shape_financial_series(rows);
        info!("financial trend: {} ({} years)", code, points.len());
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fy(label: Option<&str>, sales: &str) -> RawFinancialRecord {
        RawFinancialRecord {
            fiscal_year: label.map(str::to_string),
            revenue: Some(RawNumber::from(sales)),
            net_income: Some(RawNumber::from("10")),
            ..Default::default()
        }
    }

    #[test]
    fn test_year_window_is_365_days() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let (from, to) = chart_window(today, ChartPeriod::Year1);
        assert_eq!(to, today);
        assert_eq!((to - from).num_days(), 365);

        let unknown = ChartPeriod::parse_or_default(Some("bogus"));
        let (from, to) = chart_window(today, unknown);
        assert_eq!((to - from).num_days(), 30);
    }

    #[test]
    fn test_price_series_sorted_and_adjusted() {
        let rows = vec![
            RawPriceRecord {
                date: "2026-03-02".into(),
                close: Some(2490.0),
                adjusted_close: Some(2500.0),
                ..Default::default()
            },
            RawPriceRecord {
                date: "2026-02-27".into(),
                close: Some(2400.0),
                ..Default::default()
            },
        ];
        let points = shape_price_series(rows);
        assert_eq!(points[0].date, "2026-02-27");
        assert_eq!(points[0].adjusted_close, Some(2400.0));
        assert_eq!(points[1].adjusted_close, Some(2500.0));
        assert_eq!(points[1].close, Some(2490.0));
    }

    #[test]
    fn test_financial_series_keeps_last_five_ascending() {
        let labels = ["2021", "2018", "2024", "2019", "2025", "2020", "2023", "2022"];
        let mut rows: Vec<RawFinancialRecord> =
            labels.into_iter().map(|l| fy(Some(l), "100")).collect();
        rows.push(fy(None, "999"));
        rows.push(fy(Some(""), "999"));

        let points = shape_financial_series(rows);
        let years: Vec<&str> = points.iter().map(|p| p.fiscal_year.as_str()).collect();
        assert_eq!(years, vec!["2021", "2022", "2023", "2024", "2025"]);
    }

    #[test]
    fn test_financial_series_zero_fill() {
        let rows = vec![fy(Some("2025"), "n/a")];
        let points = shape_financial_series(rows);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].revenue, 0.0);
        assert_eq!(points[0].operating_income, 0.0);
        assert_eq!(points[0].net_income, 10.0);
    }
}
