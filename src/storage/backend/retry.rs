//! 数据库操作重试模块
//!
//! 对锁冲突、死锁、连接池耗尽等瞬时错误做指数退避重试。
//! 写操作只在能确认语句未提交时重试，避免一次访问被计两次。

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// 判断数据库错误是否可重试（读操作使用）
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::Conn(_) => true,
        other => is_replay_safe_error(other),
    }
}

/// 判断写操作失败后重放是否安全
///
/// 只接受"语句一定没有生效"的错误：获取连接超时、死锁/锁超时、
/// 序列化失败、SQLite BUSY/LOCKED。连接中途断开时无法确定提交状态，不重试；
/// 连接池已关闭也不重试。
pub fn is_replay_safe_error(err: &DbErr) -> bool {
    use sea_orm::error::ConnAcquireErr;

    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_lock_contention_error(runtime_err)
        }
        _ => false,
    }
}

/// 死锁、锁超时等锁竞争错误
fn is_lock_contention_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use sea_orm::sqlx::sqlite::SqliteError;
            use std::ops::Deref;

            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                let is_sqlite = db_err.try_downcast_ref::<SqliteError>().is_some();
                if is_lock_contention_code(code.as_ref(), is_sqlite) {
                    return true;
                }
            }
            is_lock_contention_message(&sqlx_err.to_string().to_lowercase())
        }
        RuntimeErr::Internal(msg) => is_lock_contention_message(&msg.to_lowercase()),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 按数据库错误码判断锁竞争
///
/// SQLite 的扩展错误码低 8 位是主错误码（517 BUSY_SNAPSHOT、262 LOCKED_SHAREDCACHE 等）。
fn is_lock_contention_code(code: &str, is_sqlite: bool) -> bool {
    if is_sqlite {
        return code
            .parse::<i64>()
            .is_ok_and(|c| matches!(c & 0xff, 5 | 6));
    }

    matches!(
        code,
        // MySQL 死锁和锁超时
        "1213" | "1205" |
        // PostgreSQL 序列化失败和死锁
        "40001" | "40P01"
    )
}

/// 重试配置
#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// 指数退避重试执行器（读操作）
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    with_retry_if(operation_name, config, is_retryable_error, operation).await
}

/// 指数退避重试执行器，由 `should_retry` 决定哪些错误可以重放
pub async fn with_retry_if<T, F, Fut, P>(
    operation_name: &str,
    config: RetryConfig,
    should_retry: P,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
    P: Fn(&DbErr) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if should_retry(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => {
                debug!("Operation '{}' gave up: {}", operation_name, e);
                return Err(e);
            }
        }
    }
}

/// 计算指数退避延迟（带 0-25% 抖动）
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 5,
            max_delay_ms: 20,
        }
    }

    #[test]
    fn test_connection_acquire_is_replay_safe() {
        let err = DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(is_replay_safe_error(&err));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_broken_connection_only_retried_for_reads() {
        let err = DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
            "connection reset".to_string(),
        ));
        assert!(is_retryable_error(&err));
        assert!(!is_replay_safe_error(&err));
    }

    #[test]
    fn test_sqlite_locked_is_replay_safe() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "database is locked".to_string(),
        ));
        assert!(is_replay_safe_error(&err));
    }

    #[test]
    fn test_deadlock_is_replay_safe() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string(),
        ));
        assert!(is_replay_safe_error(&err));
    }

    #[test]
    fn test_sqlite_extended_codes_are_lock_contention() {
        // BUSY / LOCKED / BUSY_RECOVERY / LOCKED_SHAREDCACHE / BUSY_SNAPSHOT
        for code in ["5", "6", "261", "262", "517"] {
            assert!(is_lock_contention_code(code, true), "code {}", code);
        }
        // CONSTRAINT / CONSTRAINT_PRIMARYKEY
        assert!(!is_lock_contention_code("19", true));
        assert!(!is_lock_contention_code("1555", true));
    }

    #[test]
    fn test_server_lock_codes() {
        assert!(is_lock_contention_code("1213", false));
        assert!(is_lock_contention_code("1205", false));
        assert!(is_lock_contention_code("40001", false));
        assert!(is_lock_contention_code("40P01", false));
        // 非 SQLite 时数字码不按低 8 位解释
        assert!(!is_lock_contention_code("5", false));
        assert!(!is_lock_contention_code("23505", false));
    }

    #[test]
    fn test_constraint_violation_not_retried() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "NOT NULL constraint failed: visitor_counts.visit_count".to_string(),
        ));
        assert!(!is_retryable_error(&err));
        assert!(!is_replay_safe_error(&err));
    }

    #[test]
    fn test_record_not_found_not_retried() {
        let err = DbErr::RecordNotFound("not found".to_string());
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_calculate_backoff_exponential() {
        let delay1 = calculate_backoff(1, 100, 2000);
        assert!((100..=125).contains(&delay1));

        let delay2 = calculate_backoff(2, 100, 2000);
        assert!((200..=250).contains(&delay2));

        let delay3 = calculate_backoff(3, 100, 2000);
        assert!((400..=500).contains(&delay3));
    }

    #[test]
    fn test_calculate_backoff_capped_at_max() {
        let delay = calculate_backoff(10, 100, 2000);
        assert!((2000..=2500).contains(&delay));
    }

    #[tokio::test]
    async fn test_with_retry_success_after_retries() {
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", fast_config(3), || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_exhausted() {
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", fast_config(2), || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<i32, _>(DbErr::ConnectionAcquire(
                    sea_orm::error::ConnAcquireErr::Timeout,
                ))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_if_skips_unsafe_write_errors() {
        let call_count = AtomicU32::new(0);

        let result = with_retry_if("test_write", fast_config(3), is_replay_safe_error, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async {
                Err::<(), _>(DbErr::Conn(sea_orm::error::RuntimeErr::Internal(
                    "connection reset by peer".to_string(),
                )))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
