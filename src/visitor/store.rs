use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::Result;

/// 天级访客计数存储
///
/// 实现方必须让 `increment_day` 成为一条原子语句（upsert-increment），
/// 不允许拆成先读后写。所有失败都以 `StoreUnavailable` 返回。
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// 当天不存在记录时插入 1，否则原子地加 1
    async fn increment_day(&self, day: NaiveDate) -> Result<()>;

    /// 指定日期的计数，无记录时为 0
    async fn count_for_day(&self, day: NaiveDate) -> Result<u64>;

    /// 所有日期计数之和
    async fn total_count(&self) -> Result<u64>;
}
