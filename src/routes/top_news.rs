use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::{
    handlers::{
        middleware::auth_middleware,
        top_news::{
            create_top_news, delete_top_news, get_top_news, get_top_news_by_id, update_top_news,
        },
    },
    utils::state::AppState,
};

/// Reads are public, mutations need a bearer token.
pub fn top_news_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let auth = from_fn_with_state(state, auth_middleware);

    Router::new()
        .route(
            "/",
            get(get_top_news).merge(post(create_top_news).route_layer(auth.clone())),
        )
        .route(
            "/{id}",
            get(get_top_news_by_id).merge(
                patch(update_top_news)
                    .delete(delete_top_news)
                    .route_layer(auth),
            ),
        )
}
