use std::collections::VecDeque;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::models::{
    activity::{ActivityEntry, ActivityRow, NewActivity},
    error::Error,
};

/// Sink for audit entries. Callers treat it as fire-and-forget.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, activity: NewActivity) -> Result<(), Error>;

    /// Most recent entries first.
    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, Error>;
}

pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for PgActivityLog {
    async fn record(&self, activity: NewActivity) -> Result<(), Error> {
        let entry = ActivityEntry::from_new(activity);
        sqlx::query(
            "INSERT INTO activity_log (id, actor_id, action, target, details, category, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(&entry.actor_id)
        .bind(entry.action.as_str())
        .bind(&entry.target)
        .bind(&entry.details)
        .bind(&entry.category)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, Error> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            "SELECT id, actor_id, action, target, details, category, created_at \
             FROM activity_log ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(ActivityEntry::try_from).collect()
    }
}

/// Oldest entries are evicted once the log holds this many.
pub const MEMORY_ACTIVITY_CAPACITY: usize = 1000;

pub struct MemoryActivityLog {
    entries: Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_ACTIVITY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActivityLog for MemoryActivityLog {
    async fn record(&self, activity: NewActivity) -> Result<(), Error> {
        let mut entries = self.entries.lock().await;
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(ActivityEntry::from_new(activity));
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<ActivityEntry>, Error> {
        let entries = self.entries.lock().await;
        Ok(entries
            .iter()
            .rev()
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
