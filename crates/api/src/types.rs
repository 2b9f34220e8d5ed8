//! # DTO (Data Transfer Object) 层
//!
//! 面向前端 JSON 输出的响应包装。筛选记录本身定义在 `kabuka-core` 中，
//! 此处只补充接口层的外壳结构。

use kabuka_core::common::ChartPeriod;
use kabuka_core::market::entity::{FinancialPoint, PricePoint};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 价格图表响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    /// 请求中的证券代码 (原样回显)
    #[schema(example = "7203")]
    pub code: String,
    /// 规范化后的图表周期
    pub period: ChartPeriod,
    /// 按日期升序的价格点
    pub data: Vec<PricePoint>,
}

/// 财务趋势响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinancialsResponse {
    #[schema(example = "7203")]
    pub code: String,
    /// 最近 5 个会计年度，按年度升序
    pub data: Vec<FinancialPoint>,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// 当前是否持有未过期的筛选载荷
    pub cached: bool,
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 错误描述信息
    pub error: String,
}

impl ApiErrorResponse {
    /// 从错误信息构建
    pub fn from_msg(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// 图表查询参数
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ChartQuery {
    /// 1D / 1W / 1M / 3M / 6M / 1Y / 3Y / 5Y，未知或缺失时按 1M 处理
    pub period: Option<String>,
}
