//! 字段优先级解析与除法守卫。

use kabuka_core::market::entity::RawNumber;

/// # Summary
/// 单个候选值是否“存在”：能解析为有限数且不为 0。
///
/// # Invariants
/// - 0 视为缺失，与上游 “预测值，否则实绩值” 的回退语义保持一致。
pub fn present(candidate: Option<&RawNumber>) -> Option<f64> {
    candidate
        .and_then(RawNumber::value)
        .filter(|v| *v != 0.0)
}

/// # Summary
/// 按优先级顺序返回第一个存在的候选值。
///
/// # Logic
/// 1. 依次对候选调用 `present`。
/// 2. 全部缺失时返回 None。
///
/// # Arguments
/// * `candidates`: 按优先级排列的候选字段 (高优先级在前)。
///
/// # Returns
/// 第一个存在的数值。
pub fn first_present(candidates: &[Option<&RawNumber>]) -> Option<f64> {
    candidates.iter().find_map(|c| present(*c))
}

/// 仅保留正值
pub fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

/// 仅保留有限值，`NaN` / `Infinity` 变为 None
pub fn finite(value: f64) -> Option<f64> {
    Some(value).filter(|v| v.is_finite())
}

/// 分母为正时计算 `numerator / denominator`，否则返回 None
pub fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let n = numerator?;
    let d = positive(denominator)?;
    finite(n / d)
}
