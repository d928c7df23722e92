use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::{
    models::{
        error::Error,
        jwt::{Claims, ROLE_ADMIN, ROLE_USER},
        top_news::{TopNewsChanges, TopNewsDraft},
    },
    utils::state::AppState,
};

const EDITOR_ROLES: &[&str] = &[ROLE_USER, ROLE_ADMIN];

pub async fn get_top_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let limit = parse_limit(&params)?;
    let items = state.top_news.list_top(limit).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "success",
            "numberOfNews": items.len(),
            "data": items,
        })),
    ))
}

pub async fn get_top_news_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let item = state.top_news.get_by_id(parse_id(&id)?).await?;
    Ok((StatusCode::OK, Json(json!({"message": "success", "data": item}))))
}

pub async fn create_top_news(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<TopNewsDraft>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    claims.require_any(EDITOR_ROLES)?;
    let Json(draft) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let item = state.top_news.insert(&claims.sub, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Item created", "item": item})),
    ))
}

pub async fn update_top_news(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<TopNewsChanges>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    claims.require_any(EDITOR_ROLES)?;
    let id = parse_id(&id)?;
    let Json(changes) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let item = state.top_news.update(&claims.sub, id, changes).await?;
    Ok((
        StatusCode::OK,
        Json(json!({"message": format!("Item with id {id} updated"), "item": item})),
    ))
}

pub async fn delete_top_news(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    claims.require_any(EDITOR_ROLES)?;
    state.top_news.delete(&claims.sub, parse_id(&id)?).await?;
    Ok((
        StatusCode::OK,
        Json(json!({"message": "Top news item deleted successfully"})),
    ))
}

pub fn parse_limit(params: &HashMap<String, String>) -> Result<Option<i64>, Error> {
    params
        .get("limit")
        .map(|l| {
            l.parse::<i64>()
                .map_err(|_| Error::Validation(format!("Invalid limit '{l}'")))
        })
        .transpose()
}

fn parse_id(raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw).map_err(|_| Error::Validation(format!("Invalid id '{raw}'")))
}
