use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use tracing::{info, warn};

use crate::{
    models::error::Error,
    services::{
        activity::{ActivityLog, MemoryActivityLog, PgActivityLog},
        media::{DiskMediaStore, MediaStore},
        ranked_list::RankedListManager,
    },
    store::{MemoryTopNewsStore, PgTopNewsStore, TopNewsStore},
    utils::config::Config,
};

#[derive(Clone)]
pub struct AppState {
    pub top_news: Arc<RankedListManager>,
    pub activity: Arc<dyn ActivityLog>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn TopNewsStore>,
        media: Arc<dyn MediaStore>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        let top_news = Arc::new(RankedListManager::new(store, media, activity.clone()));
        Self {
            top_news,
            activity,
            config,
        }
    }

    /// Connects to Postgres when `DATABASE_URL` is set, otherwise falls back
    /// to in-process stores.
    pub async fn init(config: Config) -> Result<Self, Error> {
        let media: Arc<dyn MediaStore> = Arc::new(DiskMediaStore::new(config.media_root.clone()));

        let Some(db_url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set, top news will be kept in memory");
            return Ok(Self::new(
                config,
                Arc::new(MemoryTopNewsStore::new()),
                media,
                Arc::new(MemoryActivityLog::new()),
            ));
        };

        let connect_options = PgConnectOptions::from_str(&db_url)?.statement_cache_capacity(0);
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .min_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .idle_timeout(Some(std::time::Duration::from_secs(60)))
            .connect_with(connect_options)
            .await?;
        info!("Database connection pool created successfully");

        sqlx::migrate!("./migrations").run(&db_pool).await?;
        info!("Database migrations applied");

        Ok(Self::new(
            config,
            Arc::new(PgTopNewsStore::new(db_pool.clone())),
            media,
            Arc::new(PgActivityLog::new(db_pool)),
        ))
    }
}
