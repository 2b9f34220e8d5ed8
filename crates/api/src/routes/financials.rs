use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, FinancialsResponse};

/// 获取最近 5 个会计年度的业绩趋势
#[utoipa::path(
    get,
    path = "/api/financials/{code}",
    tag = "图表 (Chart)",
    params(
        ("code" = String, Path, description = "证券代码，例如 7203")
    ),
    responses(
        (status = 200, description = "年度业绩序列", body = FinancialsResponse),
        (status = 500, description = "上游财务摘要获取失败", body = ApiErrorResponse)
    )
)]
pub async fn get_financials(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<FinancialsResponse>, ApiError> {
    let data = state.service.financial_trend(&code).await?;
    Ok(Json(FinancialsResponse { code, data }))
}
