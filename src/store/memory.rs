use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::models::{error::Error, top_news::TopNews};
use crate::store::{TopNewsStore, TopNewsTx};

/// In-process store. A transaction owns the list lock for its whole lifetime
/// and works on a copy that only replaces the shared rows on commit.
#[derive(Clone, Default)]
pub struct MemoryTopNewsStore {
    rows: Arc<Mutex<Vec<TopNews>>>,
}

impl MemoryTopNewsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TopNewsStore for MemoryTopNewsStore {
    async fn list(&self, limit: i64) -> Result<Vec<TopNews>, Error> {
        let rows = self.rows.lock().await;
        let mut entries = rows.to_vec();
        entries.sort_by_key(|e| e.position);
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }

    async fn find(&self, id: Uuid) -> Result<Option<TopNews>, Error> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|e| e.id == id).cloned())
    }

    async fn begin(&self) -> Result<Box<dyn TopNewsTx>, Error> {
        let guard = self.rows.clone().lock_owned().await;
        let working = guard.to_vec();
        Ok(Box::new(MemoryTopNewsTx { guard, working }))
    }
}

pub struct MemoryTopNewsTx {
    guard: OwnedMutexGuard<Vec<TopNews>>,
    working: Vec<TopNews>,
}

impl MemoryTopNewsTx {
    fn ensure_free(&self, position: i32, owner: Uuid) -> Result<(), Error> {
        match self
            .working
            .iter()
            .find(|e| e.position == position && e.id != owner)
        {
            Some(holder) => Err(Error::Conflict(format!(
                "Position {position} is already held by {}",
                holder.id
            ))),
            None => Ok(()),
        }
    }

    fn index_of(&self, id: Uuid) -> Result<usize, Error> {
        self.working
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound("Top news item not found".to_string()))
    }
}

#[async_trait]
impl TopNewsTx for MemoryTopNewsTx {
    async fn find(&mut self, id: Uuid) -> Result<Option<TopNews>, Error> {
        Ok(self.working.iter().find(|e| e.id == id).cloned())
    }

    async fn occupant(&mut self, position: i32) -> Result<Option<TopNews>, Error> {
        Ok(self.working.iter().find(|e| e.position == position).cloned())
    }

    async fn at_or_above(&mut self, from: i32) -> Result<Vec<TopNews>, Error> {
        let mut entries: Vec<TopNews> = self
            .working
            .iter()
            .filter(|e| e.position >= from)
            .cloned()
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.position));
        Ok(entries)
    }

    async fn set_position(&mut self, id: Uuid, position: i32) -> Result<(), Error> {
        self.ensure_free(position, id)?;
        let idx = self.index_of(id)?;
        self.working[idx].position = position;
        Ok(())
    }

    async fn insert(&mut self, entry: &TopNews) -> Result<(), Error> {
        if self.working.iter().any(|e| e.id == entry.id) {
            return Err(Error::Conflict(format!("Duplicate id {}", entry.id)));
        }
        self.ensure_free(entry.position, entry.id)?;
        self.working.push(entry.clone());
        Ok(())
    }

    async fn update(&mut self, entry: &TopNews) -> Result<(), Error> {
        self.ensure_free(entry.position, entry.id)?;
        let idx = self.index_of(entry.id)?;
        self.working[idx] = entry.clone();
        Ok(())
    }

    async fn delete(&mut self, id: Uuid) -> Result<Option<TopNews>, Error> {
        let idx = self.working.iter().position(|e| e.id == id);
        Ok(idx.map(|idx| self.working.remove(idx)))
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        let MemoryTopNewsTx { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
