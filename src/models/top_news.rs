use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::models::{error::Error, media::MediaUpdate};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Arabic,
    English,
    Kurdish,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arabic => "arabic",
            Language::English => "english",
            Language::Kurdish => "kurdish",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arabic" => Ok(Language::Arabic),
            "english" => Ok(Language::English),
            "kurdish" => Ok(Language::Kurdish),
            other => Err(Error::Internal(format!("Unknown language '{other}'"))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

/// A ranked top-news item. `position` is owned by the ranked list manager.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNews {
    pub id: Uuid,
    pub position: i32,
    pub headline: String,
    pub summary: String,
    pub category: String,
    pub source: NewsSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_more_url: Option<String>,
    pub lang: Language,
    pub photo: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[derive(FromRow, Debug)]
pub struct TopNewsRow {
    pub id: Uuid,
    pub position: i32,
    pub headline: String,
    pub summary: String,
    pub category: String,
    pub source_name: Option<String>,
    pub source_logo_url: Option<String>,
    pub read_more_url: Option<String>,
    pub lang: String,
    pub photo_refs: Vec<String>,
    pub video_ref: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl TryFrom<TopNewsRow> for TopNews {
    type Error = Error;

    fn try_from(row: TopNewsRow) -> Result<Self, Self::Error> {
        Ok(TopNews {
            id: row.id,
            position: row.position,
            headline: row.headline,
            summary: row.summary,
            category: row.category,
            source: NewsSource {
                name: row.source_name,
                logo_url: row.source_logo_url,
            },
            read_more_url: row.read_more_url,
            lang: row.lang.parse()?,
            photo: row.photo_refs,
            video: row.video_ref,
            published_at: row.published_at,
        })
    }
}

/// Body of a create request. Fields are optional so that missing values
/// surface as validation errors rather than body rejections.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNewsDraft {
    pub position: Option<i64>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub source: NewsSource,
    pub read_more_url: Option<String>,
    pub lang: Option<Language>,
    #[serde(default)]
    pub photo: Vec<String>,
    pub video: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl TopNewsDraft {
    /// Validates the draft and returns the entry it describes.
    pub fn into_entry(self) -> Result<TopNews, Error> {
        let position = match self.position {
            Some(p) => parse_position(p)?,
            None => return Err(Error::Validation("position is required".to_string())),
        };

        Ok(TopNews {
            id: Uuid::new_v4(),
            position,
            headline: required("headline", self.headline)?,
            summary: required("summary", self.summary)?,
            category: required("category", self.category)?,
            source: NewsSource {
                name: non_blank(self.source.name),
                logo_url: non_blank(self.source.logo_url),
            },
            read_more_url: non_blank(self.read_more_url),
            lang: self.lang.unwrap_or_default(),
            photo: clean_refs(self.photo),
            video: non_blank(self.video),
            published_at: self.published_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Body of a partial update. `photo`/`video` carry newly uploaded references,
/// `oldPhoto`/`oldVideo` the existing references the caller wants to keep.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNewsChanges {
    pub position: Option<i64>,
    pub headline: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub source: Option<NewsSource>,
    pub read_more_url: Option<String>,
    pub lang: Option<Language>,
    pub published_at: Option<DateTime<Utc>>,
    pub photo: Option<Vec<String>>,
    pub old_photo: Option<Vec<String>>,
    pub video: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub old_video: Option<Option<String>>,
}

/// Field changes checked and split from the media decisions.
#[derive(Debug)]
pub struct ValidatedChanges {
    pub position: Option<i32>,
    pub fields: FieldChanges,
    pub photo: MediaUpdate,
    pub video: MediaUpdate,
}

#[derive(Debug, Default)]
pub struct FieldChanges {
    headline: Option<String>,
    summary: Option<String>,
    category: Option<String>,
    source: Option<NewsSource>,
    read_more_url: Option<String>,
    lang: Option<Language>,
    published_at: Option<DateTime<Utc>>,
}

impl TopNewsChanges {
    pub fn validate(self) -> Result<ValidatedChanges, Error> {
        let position = self.position.map(parse_position).transpose()?;
        let headline = self.headline.map(|v| required("headline", Some(v))).transpose()?;
        let summary = self.summary.map(|v| required("summary", Some(v))).transpose()?;
        let category = self.category.map(|v| required("category", Some(v))).transpose()?;

        let photo = MediaUpdate::resolve(
            self.photo.map(clean_refs).filter(|refs| !refs.is_empty()),
            self.old_photo.map(clean_refs),
        );
        let video = MediaUpdate::resolve_single(non_blank(self.video), self.old_video.map(non_blank));

        Ok(ValidatedChanges {
            position,
            fields: FieldChanges {
                headline,
                summary,
                category,
                source: self.source,
                read_more_url: self.read_more_url,
                lang: self.lang,
                published_at: self.published_at,
            },
            photo,
            video,
        })
    }
}

impl FieldChanges {
    pub fn apply(self, entry: &mut TopNews) {
        if let Some(headline) = self.headline {
            entry.headline = headline;
        }
        if let Some(summary) = self.summary {
            entry.summary = summary;
        }
        if let Some(category) = self.category {
            entry.category = category;
        }
        if let Some(source) = self.source {
            if source.name.is_some() {
                entry.source.name = non_blank(source.name);
            }
            if source.logo_url.is_some() {
                entry.source.logo_url = non_blank(source.logo_url);
            }
        }
        if self.read_more_url.is_some() {
            entry.read_more_url = non_blank(self.read_more_url);
        }
        if let Some(lang) = self.lang {
            entry.lang = lang;
        }
        if let Some(published_at) = self.published_at {
            entry.published_at = published_at;
        }
    }
}

pub fn parse_position(raw: i64) -> Result<i32, Error> {
    if raw < 1 {
        return Err(Error::Validation(format!(
            "position must be a positive integer, got {raw}"
        )));
    }
    i32::try_from(raw).map_err(|_| Error::Validation(format!("position {raw} is out of range")))
}

fn required(field: &str, value: Option<String>) -> Result<String, Error> {
    non_blank(value).ok_or_else(|| Error::Validation(format!("{field} is required")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_refs(refs: Vec<String>) -> Vec<String> {
    refs.into_iter().filter_map(|r| non_blank(Some(r))).collect()
}

// Distinguishes an absent key (None) from an explicit null (Some(None)).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> TopNewsDraft {
        serde_json::from_value(json!({
            "position": 2,
            "headline": "  Election results  ",
            "summary": "Counting continues",
            "category": "politics",
            "source": { "name": "Rudaw", "logoUrl": " " },
            "photo": ["a.jpg", " ", "b.jpg"]
        }))
        .unwrap()
    }

    #[test]
    fn draft_trims_and_defaults() {
        let entry = draft().into_entry().unwrap();
        assert_eq!(entry.position, 2);
        assert_eq!(entry.headline, "Election results");
        assert_eq!(entry.lang, Language::Arabic);
        assert_eq!(entry.source.name.as_deref(), Some("Rudaw"));
        assert_eq!(entry.source.logo_url, None);
        assert_eq!(entry.photo, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn draft_requires_position_and_fields() {
        let mut missing_position = draft();
        missing_position.position = None;
        assert!(matches!(missing_position.into_entry(), Err(Error::Validation(_))));

        let mut zero = draft();
        zero.position = Some(0);
        assert!(matches!(zero.into_entry(), Err(Error::Validation(_))));

        let mut blank = draft();
        blank.category = Some("   ".into());
        assert!(matches!(blank.into_entry(), Err(Error::Validation(_))));
    }

    #[test]
    fn position_outside_i32_is_rejected() {
        assert!(parse_position(i64::from(i32::MAX) + 1).is_err());
        assert_eq!(parse_position(7).unwrap(), 7);
    }

    #[test]
    fn changes_reject_blank_required_fields() {
        let changes: TopNewsChanges = serde_json::from_value(json!({ "headline": "" })).unwrap();
        assert!(matches!(changes.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn old_video_null_differs_from_absent() {
        let cleared: TopNewsChanges = serde_json::from_value(json!({ "oldVideo": null })).unwrap();
        assert_eq!(cleared.old_video, Some(None));

        let absent: TopNewsChanges = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.old_video, None);
    }

    #[test]
    fn language_round_trips_through_text() {
        for lang in [Language::Arabic, Language::English, Language::Kurdish] {
            assert_eq!(lang.as_str().parse::<Language>().unwrap(), lang);
        }
        assert!("latin".parse::<Language>().is_err());
    }
}
