//! VisitStore implementation for SeaOrmStorage
//!
//! 计数写入是单条 upsert-increment 语句，由数据库保证原子性：
//! - SQLite/PostgreSQL: `INSERT .. ON CONFLICT (visit_date) DO UPDATE SET visit_count = visitor_counts.visit_count + excluded.visit_count`
//! - MySQL: `INSERT .. ON DUPLICATE KEY UPDATE visit_count = visit_count + VALUES(visit_count)`
//!
//! 应用层不做读-改-写。

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveValue::Set,
    ConnectionTrait, DatabaseBackend, EntityTrait, ExprTrait, QuerySelect,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, trace};

use super::SeaOrmStorage;
use super::retry;
use crate::errors::{Result, VisitorCounterError};
use crate::visitor::VisitStore;

use migration::entities::visitor_count;

/// 构造"累加已有计数"的冲突处理子句
fn increment_on_conflict(backend: DatabaseBackend) -> OnConflict {
    match backend {
        DatabaseBackend::MySql => OnConflict::column(visitor_count::Column::VisitDate)
            .value(
                visitor_count::Column::VisitCount,
                Expr::col(visitor_count::Column::VisitCount)
                    .add(Expr::cust("VALUES(visit_count)")),
            )
            .to_owned(),
        // PostgreSQL 要求限定表名，否则 visit_count 与 excluded 列存在歧义
        _ => OnConflict::column(visitor_count::Column::VisitDate)
            .value(
                visitor_count::Column::VisitCount,
                Expr::col((visitor_count::Entity, visitor_count::Column::VisitCount))
                    .add(Expr::cust("excluded.visit_count")),
            )
            .to_owned(),
    }
}

/// 全量求和表达式；SUM 在 PostgreSQL/MySQL 上返回 NUMERIC/DECIMAL，需要转回整数
fn total_sum_expr(backend: DatabaseBackend) -> &'static str {
    match backend {
        DatabaseBackend::MySql => "CAST(COALESCE(SUM(visit_count), 0) AS SIGNED)",
        _ => "CAST(COALESCE(SUM(visit_count), 0) AS BIGINT)",
    }
}

/// 计数只会递增，读到负数说明存储数据异常
fn to_count(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| {
        VisitorCounterError::store_unavailable(format!(
            "Stored visitor count is negative: {}",
            value
        ))
    })
}

#[async_trait]
impl VisitStore for SeaOrmStorage {
    async fn increment_day(&self, day: NaiveDate) -> Result<()> {
        let backend = self.db.get_database_backend();
        let db = &self.db;

        retry::with_retry_if(
            "increment_visit_count",
            self.retry_config,
            retry::is_replay_safe_error,
            || async move {
                let model = visitor_count::ActiveModel {
                    visit_date: Set(day),
                    visit_count: Set(1),
                };
                visitor_count::Entity::insert(model)
                    .on_conflict(increment_on_conflict(backend))
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            VisitorCounterError::store_unavailable(format!(
                "Failed to increment visitor count for {}: {}",
                day, e
            ))
        })?;

        trace!("Visitor count incremented for {}", day);
        Ok(())
    }

    async fn count_for_day(&self, day: NaiveDate) -> Result<u64> {
        let db = &self.db;
        let row = retry::with_retry("count_for_day", self.retry_config, || async move {
            visitor_count::Entity::find_by_id(day).one(db).await
        })
        .await
        .map_err(|e| {
            VisitorCounterError::store_unavailable(format!(
                "Failed to read visitor count for {}: {}",
                day, e
            ))
        })?;

        row.map_or(Ok(0), |m| to_count(m.visit_count))
    }

    async fn total_count(&self) -> Result<u64> {
        let backend = self.db.get_database_backend();
        let db = &self.db;

        let total: Option<i64> = retry::with_retry("total_count", self.retry_config, || async move {
            visitor_count::Entity::find()
                .select_only()
                .column_as(Expr::cust(total_sum_expr(backend)), "total_visitors")
                .into_tuple::<i64>()
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            VisitorCounterError::store_unavailable(format!(
                "Failed to read total visitor count: {}",
                e
            ))
        })?;

        // 聚合查询总会返回一行，None 视为存储异常
        let total = total.ok_or_else(|| {
            VisitorCounterError::store_unavailable("Total visitor query returned no rows")
        })?;

        debug!(
            "Total visitors read from {} database: {}",
            self.backend_name.to_uppercase(),
            total
        );
        to_count(total)
    }
}
