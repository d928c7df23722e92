use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Create,
    Update,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "CREATE",
            ActionKind::Update => "UPDATE",
            ActionKind::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(ActionKind::Create),
            "UPDATE" => Ok(ActionKind::Update),
            "DELETE" => Ok(ActionKind::Delete),
            other => Err(Error::Internal(format!("Unknown activity action '{other}'"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewActivity {
    pub actor_id: String,
    pub action: ActionKind,
    pub target: Option<String>,
    pub details: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: Uuid,
    pub actor_id: String,
    pub action: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn from_new(new: NewActivity) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor_id: new.actor_id,
            action: new.action,
            target: new.target,
            details: new.details,
            category: new.category,
            created_at: Utc::now(),
        }
    }
}

#[derive(FromRow, Debug)]
pub struct ActivityRow {
    pub id: Uuid,
    pub actor_id: String,
    pub action: String,
    pub target: Option<String>,
    pub details: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for ActivityEntry {
    type Error = Error;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(ActivityEntry {
            id: row.id,
            actor_id: row.actor_id,
            action: row.action.parse()?,
            target: row.target,
            details: row.details,
            category: row.category,
            created_at: row.created_at,
        })
    }
}
