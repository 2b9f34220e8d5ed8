use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 上游缺少业种名称时使用的哨兵值。
pub const UNKNOWN_SECTOR: &str = "不明";

/// # Summary
/// 上游数值字段的宽松表示。J-Quants 的财务字段多为字符串 (可能为空串)，
/// 少数为 JSON 数字。
///
/// # Invariants
/// - `value()` 只会返回有限值，`NaN` / `Infinity` / 空串一律视为缺失。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// 解析为有限浮点数，无法解析时返回 None。
    pub fn value(&self) -> Option<f64> {
        let parsed = match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        parsed.filter(|v| v.is_finite())
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

impl From<f64> for RawNumber {
    fn from(n: f64) -> Self {
        RawNumber::Number(n)
    }
}

/// # Summary
/// 上市证券主数据 (`/equities/master`) 单行。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMasterRecord {
    // 上游证券代码 (5 位，含内部后缀)
    #[serde(rename = "Code")]
    pub code: String,
    // 公司名称
    #[serde(rename = "CoName")]
    pub name: Option<String>,
    // 市场区分代码 (例如 0111 = Prime)
    #[serde(rename = "Mkt")]
    pub market_code: Option<String>,
    // 市场区分名称
    #[serde(rename = "MktNm")]
    pub market_name: Option<String>,
    // 33 业种名称
    #[serde(rename = "S33Nm")]
    pub sector_name: Option<String>,
}

/// # Summary
/// 日线行情 (`/equities/bars/daily`) 单行。
///
/// # Invariants
/// - 同一 (`code`, `date`) 在上游只出现一次。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPriceRecord {
    // 交易日 (YYYY-MM-DD)
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Code")]
    pub code: String,
    #[serde(rename = "O")]
    pub open: Option<f64>,
    #[serde(rename = "H")]
    pub high: Option<f64>,
    #[serde(rename = "L")]
    pub low: Option<f64>,
    #[serde(rename = "C")]
    pub close: Option<f64>,
    #[serde(rename = "V")]
    pub volume: Option<f64>,
    // 复权收盘价
    #[serde(rename = "AdjC")]
    pub adjusted_close: Option<f64>,
}

impl RawPriceRecord {
    /// 复权收盘价优先，否则使用原始收盘价。
    pub fn effective_close(&self) -> Option<f64> {
        self.adjusted_close.or(self.close)
    }
}

/// # Summary
/// 财务摘要 (`/fins/summary`) 单行，对应一个 (证券, 会计期间)。
///
/// # Invariants
/// - 以 `F` 开头的字段为公司预测值，其余为实绩值。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFinancialRecord {
    #[serde(rename = "Code")]
    pub code: Option<String>,
    // 会计年度标签
    #[serde(rename = "FY")]
    pub fiscal_year: Option<String>,
    #[serde(rename = "EPS")]
    pub eps: Option<RawNumber>,
    #[serde(rename = "FEPS")]
    pub forecast_eps: Option<RawNumber>,
    #[serde(rename = "BPS")]
    pub bps: Option<RawNumber>,
    #[serde(rename = "DivAnn")]
    pub dividend_annual: Option<RawNumber>,
    #[serde(rename = "FDivAnn")]
    pub forecast_dividend_annual: Option<RawNumber>,
    // 期末发行股数
    #[serde(rename = "ShOutFY")]
    pub shares_outstanding: Option<RawNumber>,
    // 净资产
    #[serde(rename = "Eq")]
    pub equity: Option<RawNumber>,
    // 总资产
    #[serde(rename = "TA")]
    pub total_assets: Option<RawNumber>,
    #[serde(rename = "NI")]
    pub net_income: Option<RawNumber>,
    #[serde(rename = "FNI")]
    pub forecast_net_income: Option<RawNumber>,
    // 营业收入
    #[serde(rename = "Sales")]
    pub revenue: Option<RawNumber>,
    // 营业利润
    #[serde(rename = "OI")]
    pub operating_income: Option<RawNumber>,
    // 经常利润
    #[serde(rename = "RP")]
    pub ordinary_income: Option<RawNumber>,
}

/// # Summary
/// 合并主数据、价格与财务数据后的单只证券记录，是聚合管线的输出单元。
///
/// # Invariants
/// - 所有数值字段要么是有限数，要么为 `null`，不会用 0 代替缺失。
/// - `code` 为 4 位根代码。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[schema(example = "7203")]
    pub code: String,
    #[schema(example = "トヨタ自動車")]
    pub name: String,
    #[schema(example = "輸送用機器")]
    pub sector: String,
    #[schema(example = "プライム")]
    pub market: String,
    pub price: Option<f64>,
    pub per: Option<f64>,
    pub pbr: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub market_cap: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
    pub equity_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub bps: Option<f64>,
    pub dividend: Option<f64>,
    pub net_income: Option<f64>,
    pub equity: Option<f64>,
    pub total_assets: Option<f64>,
    pub shares: Option<f64>,
    // 割安度评分 (0-13)
    #[schema(example = 7)]
    pub value_score: u8,
}

/// # Summary
/// 筛选接口的完整载荷。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScreeningPayload {
    pub stocks: Vec<StockRecord>,
    // 目标市场区分内的证券总数 (截断前)
    pub total: usize,
}

/// # Summary
/// 图表用的单日价格点。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    #[schema(example = "2026-03-02")]
    pub date: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub adjusted_close: Option<f64>,
}

/// # Summary
/// 图表用的年度业绩点。缺失值填 0 (仅用于绘图)。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialPoint {
    #[schema(example = "2025")]
    pub fiscal_year: String,
    pub revenue: f64,
    pub operating_income: f64,
    pub ordinary_income: f64,
    pub net_income: f64,
}

/// # Summary
/// 各指标 Top10 排行榜。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rankings {
    // PER 低位
    pub per: Vec<StockRecord>,
    // PBR 低位
    pub pbr: Vec<StockRecord>,
    // 股息率高位
    pub dividend: Vec<StockRecord>,
    // ROE 高位
    pub roe: Vec<StockRecord>,
    // 割安度评分高位
    pub value_score: Vec<StockRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_number_lenient_parse() {
        assert_eq!(RawNumber::from("125.0").value(), Some(125.0));
        assert_eq!(RawNumber::from(" 50 ").value(), Some(50.0));
        assert_eq!(RawNumber::from("").value(), None);
        assert_eq!(RawNumber::from("-").value(), None);
        assert_eq!(RawNumber::from("NaN").value(), None);
        assert_eq!(RawNumber::from(f64::INFINITY).value(), None);
        assert_eq!(RawNumber::from(2.5).value(), Some(2.5));
    }

    #[test]
    fn test_financial_record_deserialize_mixed_types() {
        let json = r#"{"Code":"72030","FY":"2025","EPS":"125.0","BPS":1500,"DivAnn":"","NI":null}"#;
        let rec: RawFinancialRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.eps.and_then(|v| v.value()), Some(125.0));
        assert_eq!(rec.bps.and_then(|v| v.value()), Some(1500.0));
        assert_eq!(rec.dividend_annual.and_then(|v| v.value()), None);
        assert!(rec.net_income.is_none());
        assert!(rec.forecast_eps.is_none());
    }

    #[test]
    fn test_price_record_effective_close() {
        let json = r#"{"Date":"2026-03-02","Code":"72030","C":2490.0,"AdjC":null}"#;
        let rec: RawPriceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.effective_close(), Some(2490.0));
    }

    #[test]
    fn test_stock_record_serializes_camel_case() {
        let rec = StockRecord {
            code: "7203".into(),
            name: "ToyotaX".into(),
            sector: UNKNOWN_SECTOR.into(),
            market: String::new(),
            price: Some(2500.0),
            per: None,
            pbr: None,
            dividend_yield: Some(2.0),
            market_cap: None,
            roe: None,
            roa: None,
            equity_ratio: None,
            eps: None,
            bps: None,
            dividend: None,
            net_income: None,
            equity: None,
            total_assets: None,
            shares: None,
            value_score: 1,
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["dividendYield"], 2.0);
        assert!(value["equityRatio"].is_null());
        assert_eq!(value["valueScore"], 1);
    }
}
