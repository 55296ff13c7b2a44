use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{NaiveDate, Utc};

/// 日期来源，决定一次访问落入哪个天级桶
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// 服务器时钟，按 UTC 取日期
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// 可手动设置日期的时钟（用于测试跨日切换）
#[derive(Clone)]
pub struct ManualClock {
    date: Arc<ArcSwap<NaiveDate>>,
}

impl ManualClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(ArcSwap::from_pointee(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.date.store(Arc::new(date));
    }

    /// 前进一天，返回新的日期
    pub fn advance_day(&self) -> NaiveDate {
        let next = self.today().succ_opt().unwrap_or(NaiveDate::MAX);
        self.set(next);
        next
    }
}

impl Clock for ManualClock {
    fn today(&self) -> NaiveDate {
        **self.date.load()
    }
}
