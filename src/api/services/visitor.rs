//! 访客计数 HTTP 端点
//!
//! - `GET /api/visitor/increment`: 记录一次访问，返回 `{success, error?}`（不接受 HEAD，探测请求不计数）
//! - `GET /api/visitor/stats`: 返回 `{success, dailyVisitors?, totalVisitors?, error?}`
//! - `GET /api/visitor/track`: 后台记录一次访问，立即返回 204
//!
//! 存储失败时仍返回 200，由 `success: false` 表示；调用方据此降级显示。

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::errors::VisitorCounterError;
use crate::visitor::{VisitTracker, VisitorCounter};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IncrementResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_visitors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_visitors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 对外只暴露错误类型，详细信息写日志
fn public_error(err: &VisitorCounterError) -> String {
    err.error_type().to_string()
}

pub struct VisitorService;

impl VisitorService {
    pub async fn increment(counter: web::Data<VisitorCounter>) -> impl Responder {
        let body = match counter.record_visit().await {
            Ok(()) => IncrementResponse {
                success: true,
                error: None,
            },
            Err(e) => {
                warn!("Visitor count update failed: {}", e);
                IncrementResponse {
                    success: false,
                    error: Some(public_error(&e)),
                }
            }
        };

        HttpResponse::Ok().json(body)
    }

    pub async fn stats(counter: web::Data<VisitorCounter>) -> impl Responder {
        let body = match counter.get_stats().await {
            Ok(stats) => StatsResponse {
                success: true,
                daily_visitors: Some(stats.daily_visitors),
                total_visitors: Some(stats.total_visitors),
                error: None,
            },
            Err(e) => {
                error!("Visitor stats read failed: {}", e);
                StatsResponse {
                    success: false,
                    daily_visitors: None,
                    total_visitors: None,
                    error: Some(public_error(&e)),
                }
            }
        };

        HttpResponse::Ok().json(body)
    }

    pub async fn track(tracker: web::Data<VisitTracker>) -> impl Responder {
        tracker.track();
        HttpResponse::NoContent().finish()
    }
}

/// 访客计数路由配置
pub fn visitor_routes() -> actix_web::Scope {
    web::scope("/api/visitor")
        .route("/increment", web::get().to(VisitorService::increment))
        .route("/stats", web::get().to(VisitorService::stats))
        .route("/stats", web::head().to(VisitorService::stats))
        .route("/track", web::get().to(VisitorService::track))
        .route("/track", web::post().to(VisitorService::track))
}
