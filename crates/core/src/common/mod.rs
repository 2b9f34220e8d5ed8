pub mod time;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// 证券代码根部的长度 (上游代码形如 `72030`，展示用 `7203`)。
pub const CODE_ROOT_LEN: usize = 4;

/// # Summary
/// 将上游带内部后缀的证券代码截断为 4 位根代码。
///
/// # Logic
/// 1. 按字符 (而非字节) 截取前 `CODE_ROOT_LEN` 个字符。
///
/// # Arguments
/// * `code`: 上游原始代码。
///
/// # Returns
/// 截断后的根代码；不足 4 位时原样返回。
pub fn normalize_code(code: &str) -> String {
    code.chars().take(CODE_ROOT_LEN).collect()
}

/// # Summary
/// 图表查询周期枚举，定义价格序列的回看窗口。
///
/// # Invariants
/// - 未识别的标签一律回落到 `Month1` (30 天)。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default, ToSchema)]
pub enum ChartPeriod {
    // 1日
    #[serde(rename = "1D")]
    Day1,
    // 1周
    #[serde(rename = "1W")]
    Week1,
    // 1个月
    #[default]
    #[serde(rename = "1M")]
    Month1,
    // 3个月
    #[serde(rename = "3M")]
    Month3,
    // 6个月
    #[serde(rename = "6M")]
    Month6,
    // 1年
    #[serde(rename = "1Y")]
    Year1,
    // 3年
    #[serde(rename = "3Y")]
    Year3,
    // 5年
    #[serde(rename = "5Y")]
    Year5,
}

impl ChartPeriod {
    /// 周期对应的自然日天数。
    pub fn days(self) -> i64 {
        match self {
            ChartPeriod::Day1 => 1,
            ChartPeriod::Week1 => 7,
            ChartPeriod::Month1 => 30,
            ChartPeriod::Month3 => 90,
            ChartPeriod::Month6 => 180,
            ChartPeriod::Year1 => 365,
            ChartPeriod::Year3 => 1095,
            ChartPeriod::Year5 => 1825,
        }
    }

    /// # Summary
    /// 宽松解析查询参数中的周期标签。
    ///
    /// # Logic
    /// 1. 参数缺失或无法识别时返回默认周期 `1M`。
    ///
    /// # Arguments
    /// * `label`: 可选的周期标签。
    ///
    /// # Returns
    /// 解析后的周期。
    pub fn parse_or_default(label: Option<&str>) -> Self {
        label
            .and_then(|l| l.parse::<ChartPeriod>().ok())
            .unwrap_or_default()
    }
}

impl FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1D" => Ok(ChartPeriod::Day1),
            "1W" => Ok(ChartPeriod::Week1),
            "1M" => Ok(ChartPeriod::Month1),
            "3M" => Ok(ChartPeriod::Month3),
            "6M" => Ok(ChartPeriod::Month6),
            "1Y" => Ok(ChartPeriod::Year1),
            "3Y" => Ok(ChartPeriod::Year3),
            "5Y" => Ok(ChartPeriod::Year5),
            _ => Err(format!("Unknown ChartPeriod: {}", s)),
        }
    }
}

impl std::fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartPeriod::Day1 => write!(f, "1D"),
            ChartPeriod::Week1 => write!(f, "1W"),
            ChartPeriod::Month1 => write!(f, "1M"),
            ChartPeriod::Month3 => write!(f, "3M"),
            ChartPeriod::Month6 => write!(f, "6M"),
            ChartPeriod::Year1 => write!(f, "1Y"),
            ChartPeriod::Year3 => write!(f, "3Y"),
            ChartPeriod::Year5 => write!(f, "5Y"),
        }
    }
}
