//! Ranked "top news" list.
//!
//! Entries hold unique positions. Inserting or moving an entry onto an
//! occupied position pushes every entry at or above it up by one, highest
//! position first, so no two entries ever share a slot mid-shift. Deletes
//! leave gaps. All position writes for one call happen inside a single store
//! transaction that also serializes concurrent writers.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    activity::{ActionKind, NewActivity},
    error::Error,
    media::{MediaKind, MediaOutcome},
    top_news::{TopNews, TopNewsChanges, TopNewsDraft},
};
use crate::services::{activity::ActivityLog, media::MediaStore};
use crate::store::{TopNewsStore, TopNewsTx};

pub const DEFAULT_TOP_LIMIT: i64 = 5;

// Slot a moving entry occupies while its siblings shift. Never committed.
const PARKED_POSITION: i32 = 0;

pub struct RankedListManager {
    store: Arc<dyn TopNewsStore>,
    media: Arc<dyn MediaStore>,
    activity: Arc<dyn ActivityLog>,
}

impl RankedListManager {
    pub fn new(
        store: Arc<dyn TopNewsStore>,
        media: Arc<dyn MediaStore>,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            store,
            media,
            activity,
        }
    }

    pub async fn list_top(&self, limit: Option<i64>) -> Result<Vec<TopNews>, Error> {
        let limit = limit.unwrap_or(DEFAULT_TOP_LIMIT);
        if limit < 1 {
            return Err(Error::Validation(format!(
                "limit must be a positive integer, got {limit}"
            )));
        }
        self.store.list(limit).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TopNews, Error> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Top news item not found".to_string()))
    }

    pub async fn insert(&self, actor_id: &str, draft: TopNewsDraft) -> Result<TopNews, Error> {
        let entry = draft.into_entry()?;

        let mut tx = self.store.begin().await?;
        let shifted = make_room(tx.as_mut(), entry.position).await?;
        tx.insert(&entry).await?;
        tx.commit().await?;

        info!(
            "Inserted top news {} at position {} ({shifted} shifted)",
            entry.id, entry.position
        );

        self.log_activity(
            actor_id,
            ActionKind::Create,
            &entry,
            format!(
                "Created top news \"{}\" at position {}",
                entry.headline, entry.position
            ),
        )
        .await;

        Ok(entry)
    }

    pub async fn update(
        &self,
        actor_id: &str,
        id: Uuid,
        changes: TopNewsChanges,
    ) -> Result<TopNews, Error> {
        let changes = changes.validate()?;

        let mut tx = self.store.begin().await?;
        let current = tx
            .find(id)
            .await?
            .ok_or_else(|| Error::NotFound("Top news item not found".to_string()))?;

        let target = changes.position.unwrap_or(current.position);
        let mut shifted = 0;
        if target != current.position && tx.occupant(target).await?.is_some() {
            tx.set_position(id, PARKED_POSITION).await?;
            shifted = make_room(tx.as_mut(), target).await?;
        }

        let mut updated = current.clone();
        updated.position = target;
        changes.fields.apply(&mut updated);

        let photos = changes.photo.apply(&current.photo);
        let current_video: Vec<String> = current.video.iter().cloned().collect();
        let video = changes.video.apply(&current_video);
        updated.photo = photos.refs.clone();
        updated.video = video.refs.first().cloned();

        tx.update(&updated).await?;
        tx.commit().await?;

        info!(
            "Updated top news {id}: position {} -> {} ({shifted} shifted)",
            current.position, updated.position
        );

        self.release_media(MediaKind::Photo, &photos).await;
        self.release_media(MediaKind::Video, &video).await;

        let detail = if current.position == updated.position {
            format!("Updated top news \"{}\"", updated.headline)
        } else {
            format!(
                "Updated top news \"{}\", moved from position {} to {}",
                updated.headline, current.position, updated.position
            )
        };
        self.log_activity(actor_id, ActionKind::Update, &updated, detail)
            .await;

        Ok(updated)
    }

    pub async fn delete(&self, actor_id: &str, id: Uuid) -> Result<TopNews, Error> {
        let mut tx = self.store.begin().await?;
        let removed = tx
            .delete(id)
            .await?
            .ok_or_else(|| Error::NotFound("Top news item not found".to_string()))?;
        tx.commit().await?;

        info!("Deleted top news {id} from position {}", removed.position);

        let photos = MediaOutcome {
            refs: Vec::new(),
            released: removed.photo.clone(),
        };
        let video = MediaOutcome {
            refs: Vec::new(),
            released: removed.video.iter().cloned().collect(),
        };
        self.release_media(MediaKind::Photo, &photos).await;
        self.release_media(MediaKind::Video, &video).await;

        self.log_activity(
            actor_id,
            ActionKind::Delete,
            &removed,
            format!(
                "Deleted top news \"{}\" from position {}",
                removed.headline, removed.position
            ),
        )
        .await;

        Ok(removed)
    }

    async fn release_media(&self, kind: MediaKind, outcome: &MediaOutcome) {
        for reference in &outcome.released {
            if let Err(e) = self.media.release(kind, reference).await {
                warn!("Failed to release {kind} '{reference}': {e}");
            }
        }
    }

    async fn log_activity(
        &self,
        actor_id: &str,
        action: ActionKind,
        entry: &TopNews,
        details: String,
    ) {
        let activity = NewActivity {
            actor_id: actor_id.to_string(),
            action,
            target: Some(entry.id.to_string()),
            details: Some(details),
            category: Some(entry.category.clone()),
        };
        if let Err(e) = self.activity.record(activity).await {
            warn!("Failed to log activity: {e}");
        }
    }
}

/// Frees `position` by pushing every entry at or above it up one slot.
/// Returns how many entries moved.
async fn make_room(tx: &mut dyn TopNewsTx, position: i32) -> Result<usize, Error> {
    if tx.occupant(position).await?.is_none() {
        return Ok(0);
    }

    let siblings = tx.at_or_above(position).await?;
    for sibling in &siblings {
        let next = sibling.position.checked_add(1).ok_or_else(|| {
            Error::Conflict(format!(
                "Cannot shift top news {} past position {}",
                sibling.id, sibling.position
            ))
        })?;
        debug!("Shifting {} from {} to {next}", sibling.id, sibling.position);
        tx.set_position(sibling.id, next).await?;
    }
    Ok(siblings.len())
}
