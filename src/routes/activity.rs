use std::sync::Arc;

use axum::{middleware::from_fn_with_state, routing::get, Router};

use crate::{
    handlers::{activity::get_activity_logs, middleware::auth_middleware},
    utils::state::AppState,
};

pub fn activity_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_activity_logs))
        .route_layer(from_fn_with_state(state, auth_middleware))
}
