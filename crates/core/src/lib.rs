//! # `kabuka-core` - 领域内核
//!
//! 定义日本股票筛选系统的实体、错误枚举与端口 (Port)。
//! 具体的上游适配、缓存与 HTTP 服务分别由 `kabuka-feed`、`kabuka-cache`、
//! `kabuka-api` 实现，本 crate 不依赖任何 IO 实现。

pub mod common;
pub mod config;
pub mod market;
