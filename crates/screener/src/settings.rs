use kabuka_core::config::ScreeningConfig;
use std::time::Duration;

/// # Summary
/// 管线运行参数，由 `ScreeningConfig` 转换而来，时间字段使用强类型 `Duration`。
#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    pub cache_ttl: Duration,
    pub request_interval: Duration,
    pub rate_limit_cooldown: Duration,
    pub financial_cap: usize,
    pub universe_cap: usize,
    pub price_lookback_days: u32,
    pub accepted_markets: Vec<String>,
}

impl From<&ScreeningConfig> for ScreeningSettings {
    fn from(config: &ScreeningConfig) -> Self {
        Self {
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            request_interval: Duration::from_millis(config.request_interval_ms),
            rate_limit_cooldown: Duration::from_millis(config.rate_limit_cooldown_ms),
            financial_cap: config.financial_cap,
            universe_cap: config.universe_cap,
            price_lookback_days: config.price_lookback_days,
            accepted_markets: config.accepted_markets.clone(),
        }
    }
}

impl Default for ScreeningSettings {
    fn default() -> Self {
        Self::from(&ScreeningConfig::default())
    }
}

impl ScreeningSettings {
    /// 市场区分代码是否在筛选范围内
    pub fn accepts_market(&self, market_code: Option<&str>) -> bool {
        market_code.is_some_and(|code| self.accepted_markets.iter().any(|m| m == code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ScreeningSettings::default();
        assert_eq!(settings.cache_ttl, Duration::from_secs(300));
        assert_eq!(settings.request_interval, Duration::from_millis(100));
        assert_eq!(settings.rate_limit_cooldown, Duration::from_secs(2));
        assert!(settings.accepts_market(Some("0111")));
        assert!(settings.accepts_market(Some("0112")));
        assert!(!settings.accepts_market(Some("0113")));
        assert!(!settings.accepts_market(None));
    }
}
