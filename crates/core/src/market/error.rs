use thiserror::Error;

/// # Summary
/// 市场数据域错误枚举，处理网络、HTTP 状态、限流与解析等问题。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - HTTP 429 必须映射为 `RateLimited`，以便调用方执行冷却策略。
#[derive(Error, Debug)]
pub enum MarketError {
    // 网络层错误，包含底层 HTTP 客户端错误信息
    #[error("Network error: {0}")]
    Network(String),
    // 上游返回非 2xx 状态码
    #[error("Upstream HTTP {status}: {message}")]
    Http { status: u16, message: String },
    // 上游限流 (HTTP 429)
    #[error("Upstream rate limited (HTTP 429)")]
    RateLimited,
    // 数据解析错误，如 JSON 格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
    // 缺少上游 API 凭证
    #[error("Missing upstream API credential")]
    MissingCredential,
    // 未知或未分类的错误
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl MarketError {
    /// 错误对应的上游 HTTP 状态码 (若有)。
    pub fn status(&self) -> Option<u16> {
        match self {
            MarketError::Http { status, .. } => Some(*status),
            MarketError::RateLimited => Some(429),
            _ => None,
        }
    }

    /// 是否为限流错误。
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, MarketError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(MarketError::RateLimited.status(), Some(429));
        let err = MarketError::Http {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Upstream HTTP 503: maintenance");
        assert!(MarketError::Network("reset".into()).status().is_none());
    }
}
