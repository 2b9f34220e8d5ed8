//! 配置装载：默认值 → `config/default.toml` → `KABUKA_CONFIG` 指定文件 → `KABUKA__*` 环境变量。

use config::{Config, ConfigError, Environment, File};
use kabuka_core::config::AppConfig;
use std::collections::HashMap;
use std::path::Path;

/// 仓库内置的默认配置文件 (可缺失)
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// # Summary
/// 逐层合并配置来源并反序列化为 `AppConfig`。
///
/// # Logic
/// 1. `AppConfig` 自身的 serde 默认值兜底。
/// 2. 依次叠加默认配置文件与 `overlay` 文件 (后者必须存在)。
/// 3. 叠加 `KABUKA__SECTION__KEY` 形式的环境变量。
/// 4. `upstream.api_key` 仍为空时使用 `fallback_key`。
///
/// # Arguments
/// * `overlay`: 额外的配置文件路径。
/// * `env`: 环境变量来源，`None` 时读取进程环境。
/// * `fallback_key`: 通常取自 `JQUANTS_API_KEY`。
pub fn load_config(
    overlay: Option<&Path>,
    env: Option<HashMap<String, String>>,
    fallback_key: Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
    if let Some(path) = overlay {
        builder = builder.add_source(File::from(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix("KABUKA")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("screening.accepted_markets")
            .source(env),
    );

    let mut config: AppConfig = builder.build()?.try_deserialize()?;
    if config.upstream.api_key.is_empty()
        && let Some(key) = fallback_key.filter(|k| !k.is_empty())
    {
        config.upstream.api_key = key;
    }
    Ok(config)
}
