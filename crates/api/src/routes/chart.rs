use axum::Json;
use axum::extract::{Path, Query, State};
use kabuka_core::common::ChartPeriod;

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, ChartQuery, ChartResponse};

/// 获取单只证券的价格图表序列
///
/// 代码原样透传给上游；未知周期按 1M 处理，响应中回显规范化后的周期。
#[utoipa::path(
    get,
    path = "/api/chart/{code}",
    tag = "图表 (Chart)",
    params(
        ("code" = String, Path, description = "证券代码，例如 7203"),
        ("period" = Option<String>, Query, description = "1D / 1W / 1M / 3M / 6M / 1Y / 3Y / 5Y")
    ),
    responses(
        (status = 200, description = "价格序列", body = ChartResponse),
        (status = 500, description = "上游日线获取失败", body = ApiErrorResponse)
    )
)]
pub async fn get_chart(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, ApiError> {
    let period = ChartPeriod::parse_or_default(query.period.as_deref());
    let data = state.service.price_chart(&code, period).await?;
    Ok(Json(ChartResponse { code, period, data }))
}
