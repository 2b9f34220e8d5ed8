//! 割安度评分：低估值 + 高质量的 0-13 分启发式排名。

use kabuka_core::market::entity::StockRecord;

/// 评分上限
pub const MAX_VALUE_SCORE: u8 = 13;

// 以下各维度缺失或非正时记 0 分

fn per_points(per: Option<f64>) -> u8 {
    match per.filter(|v| *v > 0.0) {
        Some(v) if v < 10.0 => 3,
        Some(v) if v < 15.0 => 2,
        Some(v) if v < 20.0 => 1,
        _ => 0,
    }
}

fn pbr_points(pbr: Option<f64>) -> u8 {
    match pbr.filter(|v| *v > 0.0) {
        Some(v) if v < 1.0 => 3,
        Some(v) if v < 1.5 => 2,
        Some(v) if v < 2.0 => 1,
        _ => 0,
    }
}

fn dividend_points(dividend_yield: Option<f64>) -> u8 {
    match dividend_yield {
        Some(v) if v >= 4.0 => 3,
        Some(v) if v >= 3.0 => 2,
        Some(v) if v >= 2.0 => 1,
        _ => 0,
    }
}

fn roe_points(roe: Option<f64>) -> u8 {
    match roe {
        Some(v) if v >= 15.0 => 2,
        Some(v) if v >= 10.0 => 1,
        _ => 0,
    }
}

fn equity_ratio_points(equity_ratio: Option<f64>) -> u8 {
    match equity_ratio {
        Some(v) if v >= 50.0 => 2,
        Some(v) if v >= 40.0 => 1,
        _ => 0,
    }
}

/// # Summary
/// 计算单只证券的割安度评分。
///
/// # Invariants
/// - 纯函数，对任意 `StockRecord` 都有定义，结果 ∈ [0, 13]。
pub fn value_score(stock: &StockRecord) -> u8 {
    per_points(stock.per)
        + pbr_points(stock.pbr)
        + dividend_points(stock.dividend_yield)
        + roe_points(stock.roe)
        + equity_ratio_points(stock.equity_ratio)
}
