use crate::resolve::{finite, first_present, positive, present, ratio};
use crate::score::value_score;
use crate::settings::ScreeningSettings;
use kabuka_core::common::normalize_code;
use kabuka_core::market::entity::{
    RawFinancialRecord, RawMasterRecord, ScreeningPayload, StockRecord, UNKNOWN_SECTOR,
};
use std::collections::HashMap;

/// # Summary
/// 从最新一期财务摘要中解析出的原始分量。
///
/// # Invariants
/// - 每个字段都经过 `resolve` 的优先级链，缺失或无法解析时为 None。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinancialFields {
    pub eps: Option<f64>,
    pub bps: Option<f64>,
    pub dividend: Option<f64>,
    pub shares: Option<f64>,
    pub equity: Option<f64>,
    pub total_assets: Option<f64>,
    pub net_income: Option<f64>,
}

impl FinancialFields {
    /// # Summary
    /// 按字段优先级解析财务摘要。
    ///
    /// # Logic
    /// 1. EPS / 年度股息 / 净利润：预测值优先，其次实绩值。
    /// 2. BPS / 股数 / 净资产 / 总资产：单一来源。
    ///
    /// # Arguments
    /// * `fin`: 最新一期财务摘要。
    ///
    /// # Returns
    /// 解析后的分量。
    pub fn resolve(fin: &RawFinancialRecord) -> Self {
        Self {
            eps: first_present(&[fin.forecast_eps.as_ref(), fin.eps.as_ref()]),
            bps: present(fin.bps.as_ref()),
            dividend: first_present(&[
                fin.forecast_dividend_annual.as_ref(),
                fin.dividend_annual.as_ref(),
            ]),
            shares: present(fin.shares_outstanding.as_ref()),
            equity: present(fin.equity.as_ref()),
            total_assets: present(fin.total_assets.as_ref()),
            net_income: first_present(&[
                fin.forecast_net_income.as_ref(),
                fin.net_income.as_ref(),
            ]),
        }
    }
}

/// # Summary
/// 由价格与财务分量推导出的比率组。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DerivedRatios {
    pub per: Option<f64>,
    pub pbr: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub equity_ratio: Option<f64>,
}

/// # Summary
/// PBR 的两级回退：直接 BPS 优先，否则用 `净资产 / 股数` 近似。
///
/// # Logic
/// 1. BPS > 0 时返回 `price / bps`。
/// 2. 否则净资产、股数均为正时以 `equity / shares` 作为 BPS。
/// 3. 均不满足时返回 None。
pub fn price_to_book(price: Option<f64>, fields: &FinancialFields) -> Option<f64> {
    let price = price?;
    if let Some(bps) = positive(fields.bps) {
        return finite(price / bps);
    }
    let equity = positive(fields.equity)?;
    let shares = positive(fields.shares)?;
    let calc_bps = finite(equity / shares)?;
    ratio(Some(price), Some(calc_bps))
}

/// # Summary
/// 计算全部派生比率。
///
/// # Logic
/// 1. PER = 价格 / EPS (EPS > 0)。
/// 2. PBR 见 `price_to_book`。
/// 3. 股息率 = 股息 / 价格 × 100 (股息 > 0)。
/// 4. 市值 = 价格 × 股数。
/// 5. ROE / ROA / 自有资本比率以百分比表示，分母必须为正。
///
/// # Arguments
/// * `price`: 最新价格，缺失时所有价格相关比率为 None。
/// * `fields`: 财务分量。
///
/// # Returns
/// 比率组，每个字段要么是有限数要么为 None。
pub fn derive_ratios(price: Option<f64>, fields: &FinancialFields) -> DerivedRatios {
    let per = ratio(price, fields.eps);
    let dividend_yield = positive(fields.dividend)
        .and_then(|d| ratio(Some(d), price))
        .and_then(|r| finite(r * 100.0));
    let market_cap = match (price, fields.shares) {
        (Some(p), Some(s)) => finite(p * s),
        _ => None,
    };
    let as_percent = |r: Option<f64>| r.and_then(|v| finite(v * 100.0));

    DerivedRatios {
        per,
        pbr: price_to_book(price, fields),
        dividend_yield,
        market_cap,
        roe: as_percent(ratio(fields.net_income, fields.equity)),
        roa: as_percent(ratio(fields.net_income, fields.total_assets)),
        equity_ratio: as_percent(ratio(fields.equity, fields.total_assets)),
    }
}

/// 取非空字符串，否则使用默认值
fn non_empty_or(value: Option<&str>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// # Summary
/// 将一行主数据与其价格、最新财务摘要合并为 `StockRecord`。
///
/// # Logic
/// 1. 代码截断为 4 位根代码，业种缺失时使用哨兵值。
/// 2. 解析财务分量并计算比率。
/// 3. 按最终记录计算割安度评分。
///
/// # Arguments
/// * `master`: 主数据行。
/// * `price`: 已选定的价格 (可能缺失)。
/// * `fin`: 最新财务摘要 (可能缺失)。
///
/// # Returns
/// 合并后的记录。
pub fn derive_stock(
    master: &RawMasterRecord,
    price: Option<f64>,
    fin: Option<&RawFinancialRecord>,
) -> StockRecord {
    let price = positive(price).and_then(finite);
    let fields = fin.map(FinancialFields::resolve).unwrap_or_default();
    let ratios = derive_ratios(price, &fields);

    let mut record = StockRecord {
        code: normalize_code(&master.code),
        name: non_empty_or(master.name.as_deref(), ""),
        sector: non_empty_or(master.sector_name.as_deref(), UNKNOWN_SECTOR),
        market: non_empty_or(master.market_name.as_deref(), ""),
        price,
        per: ratios.per,
        pbr: ratios.pbr,
        dividend_yield: ratios.dividend_yield,
        market_cap: ratios.market_cap,
        roe: ratios.roe,
        roa: ratios.roa,
        equity_ratio: ratios.equity_ratio,
        eps: fields.eps,
        bps: fields.bps,
        dividend: fields.dividend,
        net_income: fields.net_income,
        equity: fields.equity,
        total_assets: fields.total_assets,
        shares: fields.shares,
        value_score: 0,
    };
    record.value_score = value_score(&record);
    record
}

/// # Summary
/// 筛选宇宙：目标市场区分内的主数据，按上游顺序。
pub fn screening_universe<'a>(
    master: &'a [RawMasterRecord],
    settings: &ScreeningSettings,
) -> Vec<&'a RawMasterRecord> {
    master
        .iter()
        .filter(|m| settings.accepts_market(m.market_code.as_deref()))
        .collect()
}

/// # Summary
/// 对筛选宇宙的前 `universe_cap` 只证券执行合并，组装载荷。
///
/// # Logic
/// 1. 过滤目标市场区分，`total` 记录截断前的数量。
/// 2. 按上游原始代码关联价格与财务摘要。
///
/// # Arguments
/// * `master`: 全部主数据。
/// * `prices`: 原始代码到价格的索引。
/// * `financials`: 原始代码到最新财务摘要的索引。
/// * `settings`: 管线参数。
///
/// # Returns
/// 聚合载荷。
pub fn derive_payload(
    master: &[RawMasterRecord],
    prices: &HashMap<String, f64>,
    financials: &HashMap<String, RawFinancialRecord>,
    settings: &ScreeningSettings,
) -> ScreeningPayload {
    let universe = screening_universe(master, settings);
    let stocks = universe
        .iter()
        .take(settings.universe_cap)
        .map(|m| derive_stock(m, prices.get(&m.code).copied(), financials.get(&m.code)))
        .collect();

    ScreeningPayload {
        stocks,
        total: universe.len(),
    }
}
