use std::path::PathBuf;
use std::sync::Arc;

use kabuka_api::server::{AppState, start_server};
use kabuka_core::common::time::RealTimeProvider;
use kabuka_core::config::LogConfig;
use kabuka_feed::jquants::JQuantsProvider;
use kabuka_screener::service::ScreeningService;
use kabuka_screener::settings::ScreeningSettings;
use tracing::{debug, error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod loader;

/// # Summary
/// 初始化全局日志：控制台输出，配置了 `log.dir` 时额外按天滚动写文件。
///
/// # Returns
/// 文件写入器的守卫，必须持有到进程结束。
fn init_tracing(log: &LogConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let (file_layer, guard) = match &log.dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "kabuka.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();
    guard
}

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
///
/// # Logic
/// 1. 读取 `.env` 与分层配置。
/// 2. 初始化全局日志。
/// 3. 实例化上游客户端 (缺少凭证时终止启动)。
/// 4. 构造筛选服务并启动 HTTP 服务，直到收到退出信号。
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 配置
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let overlay = std::env::var("KABUKA_CONFIG").ok().map(PathBuf::from);
    let config = loader::load_config(
        overlay.as_deref(),
        None,
        std::env::var("JQUANTS_API_KEY").ok(),
    )?;

    // 2. 日志
    let _log_guard = init_tracing(&config.log);
    info!("Kabuka screener starting...");
    if dotenv_loaded {
        debug!("loaded environment from .env");
    }

    // 3. 基础设施层
    let provider = match JQuantsProvider::new(&config.upstream) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("cannot build J-Quants client: {}", e);
            return Err(e.into());
        }
    };

    // 4. 应用服务层
    let settings = ScreeningSettings::from(&config.screening);
    info!(
        "screening cache TTL {:?}, financial cap {}, universe cap {}",
        settings.cache_ttl, settings.financial_cap, settings.universe_cap
    );
    let service = Arc::new(ScreeningService::new(
        provider,
        Arc::new(RealTimeProvider),
        settings,
    ));

    start_server(AppState { service }, &config.server).await?;
    info!("Kabuka screener stopped");

    Ok(())
}
