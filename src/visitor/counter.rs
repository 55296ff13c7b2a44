//! 访客计数服务
//!
//! 两个操作：
//! - `record_visit`: 当天计数原子加 1（日期取服务器 UTC 时钟，不接受调用方传入）
//! - `get_stats`: 今日计数 + 历史总数
//!
//! `get_stats` 的两次读取相互独立，期间发生的访问可能只体现在其中一个数字里。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::clock::{Clock, SystemClock};
use super::store::VisitStore;
use crate::errors::Result;

/// 访客统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorStats {
    pub daily_visitors: u64,
    pub total_visitors: u64,
}

#[derive(Clone)]
pub struct VisitorCounter {
    store: Arc<dyn VisitStore>,
    clock: Arc<dyn Clock>,
}

impl VisitorCounter {
    pub fn new(store: Arc<dyn VisitStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn VisitStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// 记录一次访问
    pub async fn record_visit(&self) -> Result<()> {
        let today = self.clock.today();
        self.store.increment_day(today).await?;
        trace!("Visit recorded for {}", today);
        Ok(())
    }

    /// 读取今日与历史访客数
    pub async fn get_stats(&self) -> Result<VisitorStats> {
        let today = self.clock.today();
        let daily_visitors = self.store.count_for_day(today).await?;
        let total_visitors = self.store.total_count().await?;

        debug!(
            "Visitor stats for {}: daily={}, total={}",
            today, daily_visitors, total_visitors
        );

        Ok(VisitorStats {
            daily_visitors,
            total_visitors,
        })
    }
}
