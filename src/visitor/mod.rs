//! 访客计数
//!
//! - `store`: 计数存储抽象（由 SeaOrmStorage 实现）
//! - `clock`: 日期来源，按 UTC 分桶
//! - `counter`: RecordVisit / GetStats 两个操作
//! - `tracker`: 页面加载时的"发出即忘"记录

pub mod clock;
pub mod counter;
pub mod store;
pub mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counter::{VisitorCounter, VisitorStats};
pub use store::VisitStore;
pub use tracker::VisitTracker;
