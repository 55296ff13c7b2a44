use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use crate::storage::{SeaOrmStorage, StorageFactory};
use crate::visitor::{VisitStore, VisitTracker, VisitorCounter};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub counter: VisitorCounter,
    pub tracker: VisitTracker,
}

/// 准备服务器启动的上下文：存储连接、迁移、计数服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let store: Arc<dyn VisitStore> = storage.clone();
    let counter = VisitorCounter::new(store);
    let tracker = VisitTracker::new(counter.clone());

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        counter,
        tracker,
    })
}
