use chrono::{DateTime, TimeDelta, Utc};
use kabuka_core::common::time::TimeProvider;
use std::future::Future;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// # Summary
/// 缓存槽位中的唯一条目：共享的载荷与计算时间。
///
/// # Invariants
/// - 条目只会被整体替换，不会被部分修改。
pub struct CacheEntry<T> {
    pub payload: Arc<T>,
    pub computed_at: DateTime<Utc>,
}

impl<T> Clone for CacheEntry<T> {
    fn clone(&self) -> Self {
        Self {
            payload: Arc::clone(&self.payload),
            computed_at: self.computed_at,
        }
    }
}

/// # Summary
/// 单条目 TTL 缓存，带单飞 (single-flight) 刷新。
///
/// # Invariants
/// - 只持有一个条目，没有按键或局部失效。
/// - `now - computed_at < ttl` 时视为新鲜。
/// - 检查-计算-写入序列由 `refresh_gate` 串行化：并发的未命中者等待同一次计算，
///   取得锁后会重新检查新鲜度。
/// - 计算失败时保留旧条目，错误原样返回调用方。
pub struct TtlCache<T> {
    ttl: TimeDelta,
    clock: Arc<dyn TimeProvider>,
    entry: RwLock<Option<CacheEntry<T>>>,
    refresh_gate: Mutex<()>,
}

impl<T: Send + Sync> TtlCache<T> {
    /// # Summary
    /// 创建一个空缓存。
    ///
    /// # Arguments
    /// * `ttl`: 条目有效期。
    /// * `clock`: 时间供给器。
    ///
    /// # Returns
    /// * `Self` - 初始为空的缓存实例。
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
            entry: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// 读取当前条目 (不论是否过期)。
    pub fn peek(&self) -> Option<CacheEntry<T>> {
        self.entry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 读取新鲜的载荷；为空或已过期时返回 None。
    pub fn fresh(&self) -> Option<Arc<T>> {
        let now = self.clock.now();
        self.peek()
            .filter(|e| now - e.computed_at < self.ttl)
            .map(|e| e.payload)
    }

    /// 丢弃当前条目。
    pub fn invalidate(&self) {
        *self
            .entry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    fn store(&self, payload: Arc<T>) {
        let entry = CacheEntry {
            payload,
            computed_at: self.clock.now(),
        };
        *self
            .entry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(entry);
    }

    /// # Summary
    /// 命中则返回缓存，否则执行 `compute` 并写入。
    ///
    /// # Logic
    /// 1. 无锁快速路径：条目新鲜时直接返回。
    /// 2. 获取刷新锁后再次检查，其他任务可能已完成刷新。
    /// 3. 执行计算，成功则整体替换条目。
    ///
    /// # Arguments
    /// * `compute`: 生成新载荷的异步计算。
    ///
    /// # Returns
    /// 新鲜的共享载荷，或计算产生的错误。
    pub async fn get_or_refresh<F, Fut, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(payload) = self.fresh() {
            info!("cache hit");
            return Ok(payload);
        }

        let _guard = self.refresh_gate.lock().await;
        if let Some(payload) = self.fresh() {
            debug!("cache filled by concurrent refresh");
            return Ok(payload);
        }

        info!("cache miss, recomputing");
        let payload = Arc::new(compute().await?);
        self.store(Arc::clone(&payload));
        Ok(payload)
    }

    /// # Summary
    /// 无视新鲜度强制重新计算。
    ///
    /// # Logic
    /// 1. 与 `get_or_refresh` 共用刷新锁，避免与进行中的刷新并发。
    /// 2. 计算成功后整体替换条目。
    pub async fn force_refresh<F, Fut, E>(&self, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let _guard = self.refresh_gate.lock().await;
        let payload = Arc::new(compute().await?);
        self.store(Arc::clone(&payload));
        Ok(payload)
    }
}
