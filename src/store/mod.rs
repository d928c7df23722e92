pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{error::Error, top_news::TopNews};

pub use memory::MemoryTopNewsStore;
pub use postgres::PgTopNewsStore;

/// Backing store for ranked entries.
///
/// Reads outside a transaction see committed state only. Every mutation goes
/// through [`TopNewsStore::begin`], which also serializes writers on the list.
#[async_trait]
pub trait TopNewsStore: Send + Sync {
    async fn list(&self, limit: i64) -> Result<Vec<TopNews>, Error>;

    async fn find(&self, id: Uuid) -> Result<Option<TopNews>, Error>;

    async fn begin(&self) -> Result<Box<dyn TopNewsTx>, Error>;
}

/// An exclusive, all-or-nothing unit of work on the ranked list.
/// Dropping it without calling `commit` discards every write.
#[async_trait]
pub trait TopNewsTx: Send {
    async fn find(&mut self, id: Uuid) -> Result<Option<TopNews>, Error>;

    async fn occupant(&mut self, position: i32) -> Result<Option<TopNews>, Error>;

    /// Entries with `position >= from`, highest position first.
    async fn at_or_above(&mut self, from: i32) -> Result<Vec<TopNews>, Error>;

    async fn set_position(&mut self, id: Uuid, position: i32) -> Result<(), Error>;

    async fn insert(&mut self, entry: &TopNews) -> Result<(), Error>;

    async fn update(&mut self, entry: &TopNews) -> Result<(), Error>;

    async fn delete(&mut self, id: Uuid) -> Result<Option<TopNews>, Error>;

    async fn commit(self: Box<Self>) -> Result<(), Error>;
}
