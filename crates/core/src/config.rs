use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub screening: ScreeningConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    // 前端构建产物目录 (SPA)
    pub static_dir: String,
}

/// 上游 J-Quants API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    // 为空表示未配置，上游客户端构建时会拒绝
    pub api_key: String,
    pub timeout_secs: u64,
}

/// 聚合管线的节流、截断与缓存参数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    pub cache_ttl_secs: u64,
    // 财务摘要逐只请求之间的间隔
    pub request_interval_ms: u64,
    // 遇到 429 后的冷却时间
    pub rate_limit_cooldown_ms: u64,
    // 参与财务补全的证券数上限
    pub financial_cap: usize,
    // 筛选宇宙的证券数上限
    pub universe_cap: usize,
    // 回溯寻找最近交易日的天数
    pub price_lookback_days: u32,
    // 接受的市场区分代码
    pub accepted_markets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // 默认日志过滤级别，RUST_LOG 优先
    pub level: String,
    // 若设置则额外按天滚动写入该目录
    pub dir: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            static_dir: "dist".to_string(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jquants.com/v2".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            request_interval_ms: 100,
            rate_limit_cooldown_ms: 2000,
            financial_cap: 30,
            universe_cap: 200,
            price_lookback_days: 5,
            accepted_markets: vec!["0111".to_string(), "0112".to_string()],
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl ServerConfig {
    /// 监听地址，如 `0.0.0.0:3001`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
