//! HTTP client for the startup snapshot of active opportunities.

use std::time::Duration;

use anyhow::Result;
use arbwatch_core::{ArbitrageOpportunity, SnapshotConfig, SnapshotSource};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::SnapshotError;

/// Path of the snapshot endpoint, relative to the base URL.
pub const SNAPSHOT_PATH: &str = "/api/arbitrage";

/// Fetches the current opportunity list from the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpSnapshotClient {
    http: Client,
    base_url: String,
}

impl HttpSnapshotClient {
    /// Creates a client from config.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &SnapshotConfig) -> Result<Self, SnapshotError> {
        Self::with_timeout(config.base_url.clone(), config.timeout())
    }

    /// Creates a client for `base_url` with a request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SnapshotError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches and validates the snapshot. Entries that fail to parse or
    /// validate are logged and skipped; a `null` body is an empty list.
    ///
    /// # Errors
    /// Network failures, non-2xx responses and non-list bodies.
    pub async fn fetch(&self) -> Result<Vec<ArbitrageOpportunity>, SnapshotError> {
        let url = format!("{}{}", self.base_url, SNAPSHOT_PATH);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(SnapshotError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let entries: Option<Vec<serde_json::Value>> = serde_json::from_str(&body)?;

        let mut opportunities = Vec::new();
        for entry in entries.unwrap_or_default() {
            match serde_json::from_value::<ArbitrageOpportunity>(entry) {
                Ok(opp) => match opp.validate() {
                    Ok(()) => opportunities.push(opp),
                    Err(e) => warn!(id = %opp.id, error = %e, "Skipping invalid snapshot entry"),
                },
                Err(e) => warn!(error = %e, "Skipping malformed snapshot entry"),
            }
        }

        info!(count = opportunities.len(), "Fetched opportunity snapshot");
        Ok(opportunities)
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotClient {
    async fn fetch_snapshot(&self) -> Result<Vec<ArbitrageOpportunity>> {
        Ok(self.fetch().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn opportunity_json(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "event_id": "evt-1",
            "sport": "basketball_nba",
            "home_team": "Lakers",
            "away_team": "Celtics",
            "bookmaker_home": "draftkings",
            "bookmaker_away": "fanduel",
            "home_odds": 1.91,
            "away_odds": 2.20,
            "profit_percent": 2.24,
            "home_stake": 535.28,
            "away_stake": 464.72,
            "total_stake": 1000,
            "expected_return": 1022.38,
            "created_at": "2025-01-01T12:00:00Z",
            "expires_at": "2025-01-01T12:05:00Z",
            "status": "active"
        })
    }

    fn client(server: &MockServer) -> HttpSnapshotClient {
        HttpSnapshotClient::with_timeout(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_client_from_config() {
        let client = HttpSnapshotClient::new(&SnapshotConfig {
            base_url: "http://backend:8080/".to_string(),
            timeout_secs: 3,
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://backend:8080");
    }

    #[tokio::test]
    async fn test_fetch_snapshot_preserves_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/arbitrage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                opportunity_json("arb-2"),
                opportunity_json("arb-1"),
            ])))
            .mount(&mock_server)
            .await;

        let opportunities = client(&mock_server).fetch().await.unwrap();
        let ids: Vec<_> = opportunities.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["arb-2", "arb-1"]);
        assert_eq!(opportunities[0].away_odds, dec!(2.20));
    }

    #[tokio::test]
    async fn test_null_body_is_empty_snapshot() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/arbitrage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&mock_server)
            .await;

        let opportunities = client(&mock_server).fetch_snapshot().await.unwrap();
        assert!(opportunities.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_entries_are_skipped() {
        let mock_server = MockServer::start().await;

        let mut bad_odds = opportunity_json("arb-bad");
        bad_odds["home_odds"] = serde_json::json!(0.5);

        Mock::given(method("GET"))
            .and(path("/api/arbitrage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                opportunity_json("arb-1"),
                bad_odds,
                {"id": "arb-partial"},
            ])))
            .mount(&mock_server)
            .await;

        let opportunities = client(&mock_server).fetch().await.unwrap();
        assert_eq!(opportunities.len(), 1);
        assert_eq!(opportunities[0].id, "arb-1");
    }

    #[tokio::test]
    async fn test_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/arbitrage"))
            .respond_with(ResponseTemplate::new(503).set_body_string("pipeline warming up"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).fetch().await.unwrap_err();
        match err {
            SnapshotError::Api {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "pipeline warming up");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_list_body_is_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/arbitrage"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "nope"})),
            )
            .mount(&mock_server)
            .await;

        let result = client(&mock_server).fetch().await;
        assert!(matches!(result, Err(SnapshotError::Body(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client =
            HttpSnapshotClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        assert!(client.fetch_snapshot().await.is_err());
    }
}
