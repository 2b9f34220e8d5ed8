//! # API 统一错误处理
//!
//! 将上游行情错误统一映射到 HTTP 状态码与 JSON 响应体。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kabuka_core::market::error::MarketError;
use thiserror::Error;

use crate::types::ApiErrorResponse;

/// API 层统一错误枚举
#[derive(Error, Debug)]
pub enum ApiError {
    /// 资源未找到 (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// 上游数据源错误 (500)，原始信息透传给客户端
    #[error("{0}")]
    Upstream(#[from] MarketError),

    /// 其他内部错误 (500)
    #[error("internal error: {0}")]
    Internal(String),
}

/// 将 `ApiError` 转换为 axum 的 HTTP 响应
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(e) => {
                tracing::error!("upstream failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal failure: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ApiErrorResponse::from_msg(self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_keeps_raw_message() {
        let upstream = MarketError::Http {
            status: 401,
            message: "invalid api key".into(),
        };
        let expected = upstream.to_string();
        let err = ApiError::from(upstream);
        assert_eq!(err.to_string(), expected);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_status() {
        let res = ApiError::NotFound("/api/nope".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
