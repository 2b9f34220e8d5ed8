use async_trait::async_trait;
use chrono::NaiveDate;
use kabuka_core::config::UpstreamConfig;
use kabuka_core::market::entity::{RawFinancialRecord, RawMasterRecord, RawPriceRecord};
use kabuka_core::market::error::MarketError;
use kabuka_core::market::port::MarketDataProvider;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

/// 凭证请求头名称
pub const API_KEY_HEADER: &str = "x-api-key";

const MASTER_PATH: &str = "equities/master";
const DAILY_BARS_PATH: &str = "equities/bars/daily";
const FIN_SUMMARY_PATH: &str = "fins/summary";

/// 上游日期参数格式 (YYYYMMDD)
fn format_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// # Summary
/// J-Quants 响应的通用信封，业务数据位于 `data` 数组。
#[derive(Deserialize, Debug)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    // 存在时表示还有下一页
    #[serde(default)]
    pagination_key: Option<String>,
}

/// # Summary
/// J-Quants v2 行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯。
/// - 每个请求都通过默认 Header 携带 `x-api-key`。
/// - 本层不做任何重试。
#[derive(Clone)]
pub struct JQuantsProvider {
    /// 内部使用的 HTTP 客户端
    client: Client,
    /// 不带末尾斜杠的 API 根地址
    base_url: String,
}

impl JQuantsProvider {
    /// # Summary
    /// 根据上游配置创建 JQuantsProvider。
    ///
    /// # Logic
    /// 1. 凭证为空时直接拒绝 (缺少凭证对聚合路径是致命的)。
    /// 2. 安装 rustls 的 ring 加密后端 (进程内只生效一次)。
    /// 3. 将凭证写入默认 Header 并配置超时。
    ///
    /// # Arguments
    /// * `config`: 上游配置。
    ///
    /// # Returns
    /// 成功返回 Provider，凭证缺失返回 `MarketError::MissingCredential`。
    pub fn new(config: &UpstreamConfig) -> Result<Self, MarketError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(MarketError::MissingCredential);
        }

        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            debug!("rustls crypto provider already installed");
        }

        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| MarketError::Unknown(format!("Invalid API key header: {}", e)))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| MarketError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// # Summary
    /// 请求一个资源路径并返回解析后的 `data` 数组。
    ///
    /// # Logic
    /// 1. 拼接 URL 并附加查询参数。
    /// 2. HTTP 429 映射为 `RateLimited`，其余非 2xx 映射为带状态码的 `Http`。
    /// 3. 若响应带有 `pagination_key`，携带该键重复请求并拼接各页数据。
    /// 4. 任何已出现过的 `pagination_key` 再次出现时停止翻页。
    ///
    /// # Arguments
    /// * `path`: 资源路径，如 `equities/master`。
    /// * `params`: 查询参数。
    ///
    /// # Returns
    /// 成功返回全部页的数据，失败返回 MarketError。
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, MarketError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut rows = Vec::new();
        let mut pagination_key: Option<String> = None;
        let mut seen_keys: HashSet<String> = HashSet::new();

        loop {
            let mut request = self.client.get(&url).query(params);
            if let Some(key) = &pagination_key {
                request = request.query(&[("pagination_key", key.as_str())]);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| MarketError::Network(e.to_string()))?;

            let status = resp.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(MarketError::RateLimited);
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                let message = if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    body
                };
                return Err(MarketError::Http {
                    status: status.as_u16(),
                    message,
                });
            }

            let page: DataEnvelope<T> = resp
                .json()
                .await
                .map_err(|e| MarketError::Parse(e.to_string()))?;
            rows.extend(page.data);

            match page.pagination_key {
                Some(next) if !next.is_empty() => {
                    if !seen_keys.insert(next.clone()) {
                        warn!("{}: pagination_key {} repeated, stopping", path, next);
                        break;
                    }
                    debug!("{}: following pagination_key", path);
                    pagination_key = Some(next);
                }
                _ => break,
            }
        }

        Ok(rows)
    }
}

#[async_trait]
impl MarketDataProvider for JQuantsProvider {
    async fn fetch_master(&self) -> Result<Vec<RawMasterRecord>, MarketError> {
        self.get_data(MASTER_PATH, &[]).await
    }

    async fn fetch_daily_bars_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, MarketError> {
        self.get_data(DAILY_BARS_PATH, &[("date", format_date(date))])
            .await
    }

    async fn fetch_daily_bars_between(
        &self,
        code: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawPriceRecord>, MarketError> {
        self.get_data(
            DAILY_BARS_PATH,
            &[
                ("code", code.to_string()),
                ("from", format_date(from)),
                ("to", format_date(to)),
            ],
        )
        .await
    }

    async fn fetch_financial_summaries(
        &self,
        code: &str,
    ) -> Result<Vec<RawFinancialRecord>, MarketError> {
        self.get_data(FIN_SUMMARY_PATH, &[("code", code.to_string())])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        assert_eq!(format_date(date), "20260302");
    }

    #[test]
    fn test_missing_credential_is_rejected() {
        let config = UpstreamConfig {
            api_key: "   ".to_string(),
            ..UpstreamConfig::default()
        };
        assert!(matches!(
            JQuantsProvider::new(&config),
            Err(MarketError::MissingCredential)
        ));
    }

    #[test]
    fn test_envelope_without_data_is_empty() {
        let page: DataEnvelope<RawMasterRecord> = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
        assert!(page.pagination_key.is_none());
    }
}
