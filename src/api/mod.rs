//! HTTP read API over stored samples

pub mod error;
pub mod prices;

use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::PriceQueryService;
use crate::shared::config::Config;
use error::ApiError;

/// Shared state handed to every handler through `axum::extract::State`
pub struct ApiState {
    pub query: PriceQueryService,
    /// Absolute base for `url`/`next`, without trailing slash
    pub public_url: String,
    pub asset: String,
    pub route_alias: String,
    pub max_page_size: u32,
}

impl ApiState {
    pub fn new(query: PriceQueryService, config: &Config) -> Arc<Self> {
        Arc::new(Self {
            query,
            public_url: config.server.public_url.trim_end_matches('/').to_string(),
            asset: config.feed.asset.clone(),
            route_alias: config.feed.route_alias.clone(),
            max_page_size: config.api.max_page_size,
        })
    }

    pub fn serves_asset(&self, requested: &str) -> bool {
        requested.eq_ignore_ascii_case(&self.route_alias) || requested.eq_ignore_ascii_case(&self.asset)
    }
}

/// Assemble the API router. Preflight `OPTIONS` requests never reach a handler;
/// the CORS layer answers them.
pub fn router(state: Arc<ApiState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .merge(prices::routes())
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
