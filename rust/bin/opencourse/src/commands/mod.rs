pub mod catalog;
pub mod history;
pub mod interaction;

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use opencourse_sql::{SQLStore, SqliteStore};
use review::store::UserStore;
use review::{Actor, ReviewModule};

use crate::config::ServerConfig;

/// Open the configured store and bring up the review module on it.
pub fn open(config: &ServerConfig) -> Result<ReviewModule> {
    let service = config.service_config();
    if let Some(dir) = &service.data_dir {
        std::fs::create_dir_all(dir)?;
    }

    let path = service.resolve_sqlite_path();
    info!("Database: {}", path.display());
    let db: Arc<dyn SQLStore> = Arc::new(
        SqliteStore::open(&path).map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    Ok(ReviewModule::new(db, config.activity)?)
}

/// Load the acting user by id.
pub fn actor(module: &ReviewModule, user_id: i64) -> Result<Actor> {
    let user = UserStore
        .get(module.store().as_executor(), user_id)?
        .ok_or_else(|| anyhow::anyhow!("user {} not found", user_id))?;
    Ok(Actor::from(&user))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
