//! # `kabuka-cache` - 聚合结果缓存
//!
//! 单槽位、带 TTL 的内存缓存。过期在读取时判定，不使用后台定时器。

pub mod ttl;
