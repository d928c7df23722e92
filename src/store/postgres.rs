use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::{
    error::Error,
    top_news::{TopNews, TopNewsRow},
};
use crate::store::{TopNewsStore, TopNewsTx};

// Advisory lock key guarding the top_news position space.
const TOP_NEWS_LOCK_KEY: i64 = 0x746f_705f_6e65_7773;

const SELECT_TOP_NEWS: &str = "SELECT id, position, headline, summary, category, source_name, \
     source_logo_url, read_more_url, lang, photo_refs, video_ref, published_at FROM top_news";

#[derive(Clone)]
pub struct PgTopNewsStore {
    pool: PgPool,
}

impl PgTopNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_entries(rows: Vec<TopNewsRow>) -> Result<Vec<TopNews>, Error> {
    rows.into_iter().map(TopNews::try_from).collect()
}

#[async_trait]
impl TopNewsStore for PgTopNewsStore {
    async fn list(&self, limit: i64) -> Result<Vec<TopNews>, Error> {
        let sql = format!("{SELECT_TOP_NEWS} ORDER BY position ASC LIMIT $1");
        let rows = sqlx::query_as::<_, TopNewsRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        into_entries(rows)
    }

    async fn find(&self, id: Uuid) -> Result<Option<TopNews>, Error> {
        let sql = format!("{SELECT_TOP_NEWS} WHERE id = $1");
        let row = sqlx::query_as::<_, TopNewsRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TopNews::try_from).transpose()
    }

    async fn begin(&self) -> Result<Box<dyn TopNewsTx>, Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(TOP_NEWS_LOCK_KEY)
            .execute(&mut *tx)
            .await?;
        Ok(Box::new(PgTopNewsTx { tx }))
    }
}

pub struct PgTopNewsTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl TopNewsTx for PgTopNewsTx {
    async fn find(&mut self, id: Uuid) -> Result<Option<TopNews>, Error> {
        let sql = format!("{SELECT_TOP_NEWS} WHERE id = $1");
        let row = sqlx::query_as::<_, TopNewsRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(TopNews::try_from).transpose()
    }

    async fn occupant(&mut self, position: i32) -> Result<Option<TopNews>, Error> {
        let sql = format!("{SELECT_TOP_NEWS} WHERE position = $1");
        let row = sqlx::query_as::<_, TopNewsRow>(&sql)
            .bind(position)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(TopNews::try_from).transpose()
    }

    async fn at_or_above(&mut self, from: i32) -> Result<Vec<TopNews>, Error> {
        let sql = format!("{SELECT_TOP_NEWS} WHERE position >= $1 ORDER BY position DESC");
        let rows = sqlx::query_as::<_, TopNewsRow>(&sql)
            .bind(from)
            .fetch_all(&mut *self.tx)
            .await?;
        into_entries(rows)
    }

    async fn set_position(&mut self, id: Uuid, position: i32) -> Result<(), Error> {
        let result = sqlx::query("UPDATE top_news SET position = $2 WHERE id = $1")
            .bind(id)
            .bind(position)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Top news item not found".to_string()));
        }
        Ok(())
    }

    async fn insert(&mut self, entry: &TopNews) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO top_news (id, position, headline, summary, category, source_name, \
             source_logo_url, read_more_url, lang, photo_refs, video_ref, published_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(entry.id)
        .bind(entry.position)
        .bind(&entry.headline)
        .bind(&entry.summary)
        .bind(&entry.category)
        .bind(&entry.source.name)
        .bind(&entry.source.logo_url)
        .bind(&entry.read_more_url)
        .bind(entry.lang.as_str())
        .bind(&entry.photo)
        .bind(&entry.video)
        .bind(entry.published_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update(&mut self, entry: &TopNews) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE top_news SET position = $2, headline = $3, summary = $4, category = $5, \
             source_name = $6, source_logo_url = $7, read_more_url = $8, lang = $9, \
             photo_refs = $10, video_ref = $11, published_at = $12 WHERE id = $1",
        )
        .bind(entry.id)
        .bind(entry.position)
        .bind(&entry.headline)
        .bind(&entry.summary)
        .bind(&entry.category)
        .bind(&entry.source.name)
        .bind(&entry.source.logo_url)
        .bind(&entry.read_more_url)
        .bind(entry.lang.as_str())
        .bind(&entry.photo)
        .bind(&entry.video)
        .bind(entry.published_at)
        .execute(&mut *self.tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Top news item not found".to_string()));
        }
        Ok(())
    }

    async fn delete(&mut self, id: Uuid) -> Result<Option<TopNews>, Error> {
        let sql = "DELETE FROM top_news WHERE id = $1 RETURNING id, position, headline, summary, \
                   category, source_name, source_logo_url, read_more_url, lang, photo_refs, \
                   video_ref, published_at";
        let row = sqlx::query_as::<_, TopNewsRow>(sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(TopNews::try_from).transpose()
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        self.tx.commit().await?;
        Ok(())
    }
}
