//! # `kabuka-api` - HTTP API 层
//!
//! 日本股票筛选服务的 HTTP/REST 入口。
//! 使用 `axum` 构建路由，通过 `utoipa` 自动生成 OpenAPI 3.0 Swagger 文档。
//!
//! ## 架构职责
//! - 暴露筛选、排行榜、价格图表与财务趋势接口
//! - 将 `MarketError` 统一映射为 `{ "error": ... }` 响应
//! - 托管前端构建产物，非 `/api` 路径回退到 `index.html`

pub mod error;
pub mod routes;
pub mod server;
pub mod types;
