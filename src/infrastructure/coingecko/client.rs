use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::price::{PriceFeed, PriceQuote};
use crate::shared::errors::FeedError;
use crate::shared::types::CalendarDate;
use crate::shared::utils::now_ms;

/// HTTP client for `/coins/{id}` and `/coins/{id}/history`.
///
/// Both endpoints answer with
/// `{"market_data": {"current_price": {"<currency>": <number>}}}`.
pub struct CoinGeckoClient {
    http_client: Client,
    base_url: String,
    currency: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: impl Into<String>, currency: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, currency)
    }

    pub fn with_client(http_client: Client, base_url: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            currency: currency.into().to_ascii_lowercase(),
        }
    }

    pub fn request_url(&self, asset: &str, date: Option<CalendarDate>) -> String {
        match date {
            Some(date) => format!("{}/coins/{}/history?date={}", self.base_url, asset, date),
            None => format!("{}/coins/{}", self.base_url, asset),
        }
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn fetch(&self, asset: &str, date: Option<CalendarDate>) -> Result<PriceQuote, FeedError> {
        let url = self.request_url(asset, date);
        debug!("Fetching price from: {}", url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Price feed answered {} for {}", status, url);
            return Err(FeedError::Unavailable(format!("status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;
        let fetched_at = now_ms();

        let payload: Value = serde_json::from_slice(&body)
            .map_err(|e| FeedError::Parse(format!("Failed to parse json: {}", e)))?;
        let price = extract_price(&payload, &self.currency)?;

        Ok(PriceQuote { price, fetched_at })
    }
}

/// Pull `market_data.current_price.<currency>` out of a feed payload
pub fn extract_price(payload: &Value, currency: &str) -> Result<f64, FeedError> {
    let field = payload
        .get("market_data")
        .and_then(|m| m.get("current_price"))
        .and_then(|p| p.get(currency))
        .ok_or_else(|| {
            FeedError::Parse(format!("missing market_data.current_price.{}", currency))
        })?;

    field
        .as_f64()
        .filter(|p| p.is_finite())
        .ok_or_else(|| FeedError::Parse(format!("non-numeric price: {}", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_price_from_current_payload() {
        let payload = json!({
            "id": "bitcoin",
            "market_data": {
                "current_price": { "usd": 27_123.5, "eur": 25_001.0 }
            }
        });
        assert_eq!(extract_price(&payload, "usd").unwrap(), 27_123.5);
        assert_eq!(extract_price(&payload, "eur").unwrap(), 25_001.0);
    }

    #[test]
    fn test_extract_price_accepts_integers() {
        let payload = json!({ "market_data": { "current_price": { "usd": 42000 } } });
        assert_eq!(extract_price(&payload, "usd").unwrap(), 42_000.0);
    }

    #[test]
    fn test_extract_price_missing_path() {
        // history endpoint omits market_data for days before listing
        let payload = json!({ "id": "bitcoin", "name": "Bitcoin" });
        assert!(matches!(extract_price(&payload, "usd"), Err(FeedError::Parse(_))));

        let payload = json!({ "market_data": { "current_price": { "eur": 1.0 } } });
        assert!(matches!(extract_price(&payload, "usd"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_extract_price_non_numeric() {
        let payload = json!({ "market_data": { "current_price": { "usd": "27000" } } });
        assert!(matches!(extract_price(&payload, "usd"), Err(FeedError::Parse(_))));
    }

    #[test]
    fn test_request_urls() {
        let client = CoinGeckoClient::new("https://api.coingecko.com/api/v3/", "USD");
        assert_eq!(
            client.request_url("bitcoin", None),
            "https://api.coingecko.com/api/v3/coins/bitcoin"
        );
        let date: CalendarDate = "01-01-2024".parse().unwrap();
        assert_eq!(
            client.request_url("bitcoin", Some(date)),
            "https://api.coingecko.com/api/v3/coins/bitcoin/history?date=01-01-2024"
        );
    }

    #[tokio::test]
    async fn test_unreachable_feed_is_unavailable() {
        // nothing listens on the discard port
        let client = local_client("http://127.0.0.1:9".to_string());
        let result = client.fetch("bitcoin", None).await;
        assert!(matches!(result, Err(FeedError::Unavailable(_))));
    }

    fn local_client(base_url: String) -> CoinGeckoClient {
        let http_client = Client::builder().no_proxy().build().unwrap();
        CoinGeckoClient::with_client(http_client, base_url, "usd")
    }

    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_history_against_stub_server() {
        use axum::extract::Query;
        use axum::routing::get;
        use std::collections::HashMap;

        let router = axum::Router::new().route(
            "/coins/bitcoin/history",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let price = if q.get("date").map(String::as_str) == Some("01-01-2024") {
                    42_280.23
                } else {
                    0.0
                };
                axum::Json(json!({ "market_data": { "current_price": { "usd": price } } }))
            }),
        );
        let base_url = serve(router).await;

        let client = local_client(base_url);
        let date: CalendarDate = "01-01-2024".parse().unwrap();
        let quote = client.fetch("bitcoin", Some(date)).await.unwrap();
        assert_eq!(quote.price, 42_280.23);
        assert!(quote.fetched_at > 0);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_unavailable() {
        use axum::http::StatusCode;
        use axum::routing::get;

        let router = axum::Router::new().route(
            "/coins/bitcoin",
            get(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let client = local_client(serve(router).await);
        assert!(matches!(
            client.fetch("bitcoin", None).await,
            Err(FeedError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_garbage_body_is_parse_error() {
        use axum::routing::get;

        let router = axum::Router::new().route("/coins/bitcoin", get(|| async { "<html>oops</html>" }));
        let client = local_client(serve(router).await);
        assert!(matches!(
            client.fetch("bitcoin", None).await,
            Err(FeedError::Parse(_))
        ));
    }
}
