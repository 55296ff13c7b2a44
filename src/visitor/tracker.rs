//! 页面加载时的访问记录
//!
//! 计数属于尽力而为的遥测：在后台任务中执行，失败只记录日志，
//! 不重试，也不影响页面请求本身。

use tracing::warn;

use super::counter::VisitorCounter;

#[derive(Clone)]
pub struct VisitTracker {
    counter: VisitorCounter,
}

impl VisitTracker {
    pub fn new(counter: VisitorCounter) -> Self {
        Self { counter }
    }

    /// 发出即忘；返回的 JoinHandle 仅供测试等待完成
    pub fn track(&self) -> tokio::task::JoinHandle<()> {
        let counter = self.counter.clone();
        tokio::spawn(async move {
            if let Err(e) = counter.record_visit().await {
                warn!("Visitor count update failed (ignored): {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Result, VisitorCounterError};
    use crate::visitor::VisitStore;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct CountingStore {
        increments: AtomicU64,
        fail: bool,
    }

    #[async_trait]
    impl VisitStore for CountingStore {
        async fn increment_day(&self, _day: NaiveDate) -> Result<()> {
            if self.fail {
                return Err(VisitorCounterError::store_unavailable("down"));
            }
            self.increments.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn count_for_day(&self, _day: NaiveDate) -> Result<u64> {
            Ok(self.increments.load(Ordering::SeqCst))
        }

        async fn total_count(&self) -> Result<u64> {
            Ok(self.increments.load(Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn test_track_records_in_background() {
        let store = Arc::new(CountingStore {
            increments: AtomicU64::new(0),
            fail: false,
        });
        let tracker = VisitTracker::new(VisitorCounter::new(store.clone()));

        let handles: Vec<_> = (0..5).map(|_| tracker.track()).collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.increments.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_track_swallows_store_failure() {
        let store = Arc::new(CountingStore {
            increments: AtomicU64::new(0),
            fail: true,
        });
        let tracker = VisitTracker::new(VisitorCounter::new(store));

        // 任务正常结束，不向调用方传播错误
        assert!(tracker.track().await.is_ok());
    }
}
