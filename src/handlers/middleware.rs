use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::sync::Arc;

use crate::{
    models::{error::Error, jwt::Claims},
    utils::state::AppState,
};

pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, Error> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| Error::Unauthorized("Missing Bearer token".to_string()))?;

    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let decoded = decode::<Claims>(bearer.token(), &decoding_key, &validation)?;

    req.extensions_mut().insert(decoded.claims);

    Ok(next.run(req).await)
}
