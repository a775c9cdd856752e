use axum::extract::{OriginalUri, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ApiError;
use super::ApiState;
use crate::domain::sample::Sample;
use crate::shared::errors::ValidationError;
use crate::shared::types::CalendarDate;

pub const DEFAULT_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceRow {
    pub timestamp: i64,
    pub price: f64,
    pub coin: String,
}

impl From<Sample> for PriceRow {
    fn from(sample: Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            price: sample.price,
            coin: sample.currency,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceResponse {
    pub url: String,
    pub next: String,
    pub count: u64,
    pub data: Vec<PriceRow>,
}

/// Validated `date`/`limit`/`offset` query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub date: CalendarDate,
    pub limit: u32,
    pub offset: u64,
}

impl PageParams {
    /// `limit` defaults to 100 and is capped at `max_page_size`; `0` yields an
    /// empty page. `offset` defaults to 0. Negative or non-numeric values are rejected.
    pub fn parse(query: &HashMap<String, String>, max_page_size: u32) -> Result<Self, ValidationError> {
        let limit = match non_empty(query, "limit") {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ValidationError::Limit(raw.to_string()))?,
        };
        let offset = match non_empty(query, "offset") {
            None => 0,
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| ValidationError::Offset(raw.to_string()))?,
        };
        let date = query
            .get("date")
            .ok_or_else(|| ValidationError::Date(String::new()))?
            .parse::<CalendarDate>()?;

        let max = u64::from(max_page_size.max(1));
        Ok(Self {
            date,
            limit: limit.min(max) as u32,
            offset,
        })
    }
}

fn non_empty<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/prices/:asset",
        get(api_prices).fallback(method_not_allowed),
    )
}

async fn api_prices(
    State(state): State<Arc<ApiState>>,
    Path(asset): Path<String>,
    OriginalUri(uri): OriginalUri,
    query: Option<Query<HashMap<String, String>>>,
) -> Result<Json<PriceResponse>, ApiError> {
    if !state.serves_asset(&asset) {
        return Err(ApiError::NotFound);
    }

    let query = query.map(|Query(q)| q).unwrap_or_default();
    let params = PageParams::parse(&query, state.max_page_size)?;

    let page = state
        .query
        .page(params.date, params.limit, params.offset)
        .await?;

    let request_target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    Ok(Json(PriceResponse {
        url: format!("{}{}", state.public_url, request_target),
        next: format!(
            "{}/api/prices/{}?date={}&offset={}&limit={}",
            state.public_url,
            asset,
            params.date,
            params.offset.saturating_add(u64::from(params.limit)),
            params.limit
        ),
        count: page.count,
        data: page.samples.into_iter().map(PriceRow::from).collect(),
    }))
}

async fn method_not_allowed() -> impl IntoResponse {
    ([(header::ALLOW, "GET")], ApiError::MethodNotAllowed)
}
