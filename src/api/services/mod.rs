pub mod health;
pub mod visitor;

pub use health::{AppStartTime, HealthService, health_routes};
pub use visitor::{StatsResponse, IncrementResponse, VisitorService, visitor_routes};
