pub mod activity;
pub mod top_news;

use axum::{response::IntoResponse, routing::get, Json, Router};
use http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub use activity::activity_routes;
pub use top_news::top_news_routes;

use crate::{
    models::error::Error,
    utils::{config::Config, state::AppState},
};

pub fn init_tracing(log_level: &str) {
    let level = match log_level {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();
}

pub async fn make_app(config: Config) -> Result<Router, Error> {
    init_tracing(&config.log_level);
    config.log_defaults();

    info!("Initializing application...");
    let state = Arc::new(AppState::init(config).await?);
    let app = build_router(state);
    info!("Application initialized successfully");

    Ok(app)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .nest("/top-news", top_news_routes(state.clone()))
        .nest("/activity", activity_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "ok"})))
}
