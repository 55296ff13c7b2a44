//! SeaORM storage backend
//!
//! This module provides the visitor count store on top of SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
pub mod retry;
mod visits;

use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{Result, VisitorCounterError};
use crate::storage::models::StorageConfig;

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(VisitorCounterError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        "postgresql" | "pg" => "postgres".to_string(),
        other => other.to_string(),
    }
}

/// 把裸文件路径补全为 sqlx 可识别的 SQLite URL
fn normalize_sqlite_url(database_url: &str) -> String {
    if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    }
}

/// SeaORM-based visitor count store
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// 使用全局配置中的数据库参数创建存储（未初始化时使用默认值）
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        let db_config = crate::config::try_get_config()
            .map(|c| c.database.clone())
            .unwrap_or_default();
        Self::with_config(database_url, backend_name, &db_config).await
    }

    pub async fn with_config(
        database_url: &str,
        backend_name: &str,
        db_config: &DatabaseConfig,
    ) -> Result<Self> {
        if database_url.is_empty() {
            return Err(VisitorCounterError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let backend_name = normalize_backend_name(backend_name);
        let retry_config = retry::RetryConfig {
            max_retries: db_config.retry_count,
            base_delay_ms: db_config.retry_base_delay_ms,
            max_delay_ms: db_config.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(&normalize_sqlite_url(database_url)).await?
        } else {
            connect_generic(database_url, &backend_name, db_config).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
        }
    }

    /// 获取数据库连接（用于关闭连接池、测试直接查询等场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// 探测数据库连通性（健康检查使用）
    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(VisitorCounterError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sqlite_url() {
        assert_eq!(normalize_sqlite_url(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite://data/visitors.db?mode=rwc"),
            "sqlite://data/visitors.db?mode=rwc"
        );
        assert_eq!(normalize_sqlite_url("visitors.db"), "sqlite://visitors.db");
    }

    #[test]
    fn test_empty_url_rejected_by_inference() {
        assert!(infer_backend_from_url("").is_err());
    }
}
