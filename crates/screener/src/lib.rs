//! # `kabuka-screener` - 聚合与指标推导管线
//!
//! 将主数据、日线与财务摘要三路上游数据按证券代码合并为 `StockRecord`，
//! 并计算 PER / PBR / 股息率 / ROE / ROA / 自有资本比率与割安度评分。
//!
//! ## 组成
//! - `price`: 回溯寻找最近一个有日线的交易日
//! - `financial`: 逐只、限速地获取财务摘要
//! - `metrics` / `resolve` / `score`: 字段优先级解析与指标计算
//! - `ranking`: 基于缓存载荷的各指标 Top10
//! - `chart`: 单只证券的图表序列整形 (不经缓存)
//! - `pipeline`: 上述组件的顺序编排
//! - `service`: 缓存门面，供 HTTP 层持有

pub mod chart;
pub mod financial;
pub mod metrics;
pub mod pacing;
pub mod pipeline;
pub mod price;
pub mod ranking;
pub mod resolve;
pub mod score;
pub mod service;
pub mod settings;
