//! # `kabuka-feed` - 上游行情适配层
//!
//! 以 `reqwest` 实现 `MarketDataProvider`，对接 J-Quants v2 REST API。

pub mod jquants;
