//! # 筛选路由控制器
//!
//! 实现 `/api/screening`、`/api/rankings` 与 `/api/health`。
//! 筛选载荷经服务层 TTL 缓存，TTL 内的请求不会触达上游。

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use kabuka_core::market::entity::{Rankings, ScreeningPayload};

use crate::error::ApiError;
use crate::server::AppState;
use crate::types::{ApiErrorResponse, HealthResponse};

/// 获取筛选载荷
///
/// 返回目标市场区分内前 200 只证券的合并记录与截断前总数。
#[utoipa::path(
    get,
    path = "/api/screening",
    tag = "筛选 (Screening)",
    responses(
        (status = 200, description = "筛选载荷", body = ScreeningPayload),
        (status = 500, description = "上游主数据获取失败", body = ApiErrorResponse)
    )
)]
pub async fn get_screening(
    State(state): State<AppState>,
) -> Result<Json<Arc<ScreeningPayload>>, ApiError> {
    let payload = state.service.screening().await?;
    Ok(Json(payload))
}

/// 无视 TTL 重新聚合筛选载荷
#[utoipa::path(
    post,
    path = "/api/screening/refresh",
    tag = "筛选 (Screening)",
    responses(
        (status = 200, description = "新计算的筛选载荷", body = ScreeningPayload),
        (status = 500, description = "上游主数据获取失败", body = ApiErrorResponse)
    )
)]
pub async fn refresh_screening(
    State(state): State<AppState>,
) -> Result<Json<Arc<ScreeningPayload>>, ApiError> {
    tracing::info!("manual screening refresh requested");
    let payload = state.service.refresh().await?;
    Ok(Json(payload))
}

/// 获取各指标 Top10 排行榜
#[utoipa::path(
    get,
    path = "/api/rankings",
    tag = "筛选 (Screening)",
    responses(
        (status = 200, description = "排行榜", body = Rankings),
        (status = 500, description = "上游主数据获取失败", body = ApiErrorResponse)
    )
)]
pub async fn get_rankings(State(state): State<AppState>) -> Result<Json<Rankings>, ApiError> {
    let rankings = state.service.rankings().await?;
    Ok(Json(rankings))
}

/// 健康检查
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "系统 (System)",
    responses(
        (status = 200, description = "服务存活", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        cached: state.service.is_cached(),
    })
}
