//! # API 服务启动器
//!
//! 组装 axum 路由、挂载 Swagger UI、配置 CORS 与前端静态资源托管并绑定 TCP 端口。
//! 本模块不直接启动 `main()`, 而是由 `crates/app` 组装依赖后调用。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use kabuka_core::config::ServerConfig;
use kabuka_screener::service::ScreeningService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiError;
use crate::routes::{chart, financials, screening};

// ============================================================
//  共享应用状态
// ============================================================

/// 全局应用状态，通过 axum 的 `State` 提取器注入到每个 Handler 中。
///
/// # Invariants
/// - `service` 在服务启动前注入，生命周期与进程等同；缓存随之常驻。
#[derive(Clone)]
pub struct AppState {
    /// 筛选服务门面 (持有缓存与上游端口)
    pub service: Arc<ScreeningService>,
}

// ============================================================
//  OpenAPI 文档定义
// ============================================================

/// 全局 OpenAPI 文档结构
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kabuka Screening API",
        version = "0.1.0",
        description = "基于 J-Quants 数据的日本股票筛选 API。提供估值指标、割安度评分、价格图表与财务趋势。",
        license(name = "MIT")
    ),
    tags(
        (name = "筛选 (Screening)", description = "全市场筛选载荷与排行榜，结果缓存 5 分钟"),
        (name = "图表 (Chart)", description = "单只证券的价格序列与年度业绩，直连上游"),
        (name = "系统 (System)", description = "健康检查")
    )
)]
pub struct ApiDoc;

// ============================================================
//  服务构建与启动
// ============================================================

/// # Summary
/// 构建完整的 axum 应用路由树。
///
/// # Logic
/// 1. 注册全部 `/api` 路由并收集 OpenAPI 文档。
/// 2. 挂载 Swagger UI。
/// 3. 未匹配的路径：`/api` 前缀返回 404 JSON，其余交给静态资源 (缺失文件回退 `index.html`)。
/// 4. 应用宽松 CORS。
///
/// # Arguments
/// * `state` - 共享状态
/// * `static_dir` - 前端构建产物目录，`None` 时不托管静态资源
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(screening::get_screening))
        .routes(routes!(screening::refresh_screening))
        .routes(routes!(screening::get_rankings))
        .routes(routes!(screening::health))
        .routes(routes!(chart::get_chart))
        .routes(routes!(financials::get_financials))
        .with_state(state)
        .split_for_parts();

    // 与前端开发服务器跨域联调，允许所有来源
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = static_dir.map(Arc::new);
    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        .fallback(move |req: Request| spa_fallback(assets.clone(), req))
        .layer(cors)
}

async fn spa_fallback(assets: Option<Arc<PathBuf>>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    let Some(root) = assets.filter(|_| !path.starts_with("/api")) else {
        return ApiError::NotFound(path).into_response();
    };

    let index = ServeFile::new(root.join("index.html"));
    let mut serve = ServeDir::new(root.as_path()).fallback(index);
    match serve.try_call(req).await {
        Ok(res) => res.map(Body::new).into_response(),
        Err(e) => ApiError::Internal(e.to_string()).into_response(),
    }
}

/// # Summary
/// 构建路由并启动 HTTP 监听，直到收到 Ctrl-C。
///
/// # Arguments
/// * `state` - 由 `app` 组装的共享状态
/// * `config` - 监听地址与静态资源目录
pub async fn start_server(
    state: AppState,
    config: &ServerConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let static_dir = Path::new(&config.static_dir);
    let assets = if static_dir.is_dir() {
        tracing::info!("serving static bundle from {}", static_dir.display());
        Some(static_dir.to_path_buf())
    } else {
        tracing::warn!(
            "static bundle directory {} not found, serving API only",
            static_dir.display()
        );
        None
    };

    let app = build_router(state, assets);
    let bind_addr = config.bind_addr();

    tracing::info!("Kabuka API Server listening on {}", bind_addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received. Exiting...");
        })
        .await?;

    Ok(())
}
