use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use http::StatusCode;
use serde_json::json;

use crate::{
    handlers::top_news::parse_limit,
    models::{
        error::Error,
        jwt::{Claims, ROLE_ADMIN},
    },
    utils::state::AppState,
};

const DEFAULT_ACTIVITY_LIMIT: i64 = 100;

pub async fn get_activity_logs(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    claims.require_any(&[ROLE_ADMIN])?;

    let limit = parse_limit(&params)?.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    if limit < 1 {
        return Err(Error::Validation(format!(
            "limit must be a positive integer, got {limit}"
        )));
    }

    let logs = state.activity.recent(limit).await?;
    Ok((StatusCode::OK, Json(json!({"status": "success", "data": logs}))))
}
