//! Visitor counter integration tests
//!
//! Runs the counting logic against a real SQLite database in a temp dir.

use std::sync::Arc;

use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use tempfile::TempDir;

use migration::entities::visitor_count;
use visitor_counter::storage::SeaOrmStorage;
use visitor_counter::visitor::{ManualClock, VisitStore, VisitTracker, VisitorCounter};

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("visitors.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (Arc::new(storage), temp_dir)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn counter_at(storage: &Arc<SeaOrmStorage>, day: NaiveDate) -> (VisitorCounter, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(day));
    let store: Arc<dyn VisitStore> = storage.clone();
    (VisitorCounter::with_clock(store, clock.clone()), clock)
}

async fn row_sum(storage: &SeaOrmStorage) -> i64 {
    visitor_count::Entity::find()
        .all(storage.get_db())
        .await
        .unwrap()
        .iter()
        .map(|m| m.visit_count)
        .sum()
}

#[tokio::test]
async fn test_empty_store_reports_zero() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 1, 1));

    let stats = counter.get_stats().await.unwrap();
    assert_eq!(stats.daily_visitors, 0);
    assert_eq!(stats.total_visitors, 0);
}

#[tokio::test]
async fn test_first_visit_of_day_creates_row() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 3, 15));

    counter.record_visit().await.unwrap();

    let row = visitor_count::Entity::find_by_id(date(2024, 3, 15))
        .one(storage.get_db())
        .await
        .unwrap()
        .expect("row for today should exist");
    assert_eq!(row.visit_count, 1);

    let stats = counter.get_stats().await.unwrap();
    assert_eq!(stats.daily_visitors, 1);
    assert_eq!(stats.total_visitors, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_visits_are_not_lost() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 6, 1));

    const VISITS: u64 = 50;
    let handles: Vec<_> = (0..VISITS)
        .map(|_| {
            let counter = counter.clone();
            tokio::spawn(async move { counter.record_visit().await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(storage.count_for_day(date(2024, 6, 1)).await.unwrap(), VISITS);
    assert_eq!(storage.total_count().await.unwrap(), VISITS);

    let rows = visitor_count::Entity::find()
        .all(storage.get_db())
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_day_rollover_starts_new_row() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, clock) = counter_at(&storage, date(2024, 1, 1));

    for _ in 0..4 {
        counter.record_visit().await.unwrap();
    }

    clock.advance_day();
    counter.record_visit().await.unwrap();

    assert_eq!(storage.count_for_day(date(2024, 1, 1)).await.unwrap(), 4);
    assert_eq!(storage.count_for_day(date(2024, 1, 2)).await.unwrap(), 1);

    let stats = counter.get_stats().await.unwrap();
    assert_eq!(stats.daily_visitors, 1);
    assert_eq!(stats.total_visitors, 5);
}

#[tokio::test]
async fn test_total_equals_sum_of_rows() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, clock) = counter_at(&storage, date(2023, 12, 30));

    for visits in [2, 0, 7, 1] {
        for _ in 0..visits {
            counter.record_visit().await.unwrap();
        }
        clock.advance_day();
    }

    let total = storage.total_count().await.unwrap();
    assert_eq!(total, 10);
    assert_eq!(row_sum(&storage).await, 10);
}

#[tokio::test]
async fn test_two_day_scenario() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, clock) = counter_at(&storage, date(2024, 1, 1));

    for _ in 0..5 {
        counter.record_visit().await.unwrap();
    }

    clock.set(date(2024, 1, 2));
    for _ in 0..3 {
        counter.record_visit().await.unwrap();
    }

    let stats = counter.get_stats().await.unwrap();
    assert_eq!((stats.daily_visitors, stats.total_visitors), (3, 8));

    counter.record_visit().await.unwrap();
    let stats = counter.get_stats().await.unwrap();
    assert_eq!((stats.daily_visitors, stats.total_visitors), (4, 9));
}

#[tokio::test]
async fn test_stats_reads_do_not_mutate() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 2, 29));

    counter.record_visit().await.unwrap();
    for _ in 0..5 {
        counter.get_stats().await.unwrap();
    }

    assert_eq!(row_sum(&storage).await, 1);
}

#[tokio::test]
async fn test_tracker_records_in_background() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 5, 5));
    let tracker = VisitTracker::new(counter);

    tracker.track().await.unwrap();
    tracker.track().await.unwrap();

    assert_eq!(storage.count_for_day(date(2024, 5, 5)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_counts_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("persist.db").display()
    );

    {
        let storage = Arc::new(SeaOrmStorage::new(&db_url, "sqlite").await.unwrap());
        let (counter, _clock) = counter_at(&storage, date(2024, 7, 4));
        counter.record_visit().await.unwrap();
        counter.record_visit().await.unwrap();
        storage.get_db().clone().close().await.unwrap();
    }

    // 重新打开时迁移应幂等
    let storage = SeaOrmStorage::new(&db_url, "sqlite").await.unwrap();
    assert_eq!(storage.count_for_day(date(2024, 7, 4)).await.unwrap(), 2);
}

#[tokio::test]
async fn test_corrupt_negative_row_is_store_unavailable() {
    let (storage, _dir) = create_temp_storage().await;
    let (counter, _clock) = counter_at(&storage, date(2024, 8, 1));

    visitor_count::ActiveModel {
        visit_date: Set(date(2024, 8, 1)),
        visit_count: Set(-5),
    }
    .insert(storage.get_db())
    .await
    .unwrap();

    let err = counter.get_stats().await.unwrap_err();
    assert!(err.is_store_unavailable());
}
