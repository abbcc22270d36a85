//! Client for the jsDelivr-hosted `currency-api` snapshots.
//!
//! Data is published per day as a versioned npm package, so a fetch is one
//! GET against `currency-api@<yyyy.M.d>/v1/currencies/<code>.json`. Dates
//! with no published data answer 404.

use crate::date;
use crate::error::RateError;
use crate::rates::{RateQuery, RateSnapshot, RateSource};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// CDN root serving the daily `currency-api` packages.
pub const DEFAULT_BASE_URL: &str = "https://cdn.jsdelivr.net/npm/@fawazahmed0";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct CurrencyApiSource {
    base_url: String,
    client: reqwest::Client,
}

impl CurrencyApiSource {
    /// Builds the source with one long-lived HTTP client. A single
    /// resolution can fan a date search across hundreds of sequential
    /// requests, and every request carries the same bounded timeout.
    pub fn new(base_url: &str) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .user_agent("fxtab/0.2")
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url_for(&self, query: &RateQuery) -> String {
        format!(
            "{}/currency-api@{}/v1/currencies/{}.json",
            self.base_url,
            date::canonical(query.date),
            query.currency
        )
    }
}

#[async_trait]
impl RateSource for CurrencyApiSource {
    async fn fetch(&self, query: &RateQuery) -> Result<Option<RateSnapshot>, RateError> {
        let url = self.url_for(query);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;

        // 404 means the source has nothing for this date. The resolver
        // searches on that signal; it is not a failure.
        if response.status() == StatusCode::NOT_FOUND {
            debug!(query = %query, "no data published for this date");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RateError::Status {
                status: response.status(),
                url,
            });
        }

        let body = response.text().await?;
        let snapshot: RateSnapshot = serde_json::from_str(&body)?;
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(currency: &str, y: i32, m: u32, d: u32) -> RateQuery {
        RateQuery::new(currency, NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    async fn mount(server: &MockServer, request_path: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let server = MockServer::start().await;
        let body = r#"{
            "date": "2024-03-06",
            "usd": {"eur": 0.92, "gbp": 0.79},
            "added-later": {"usd": 1.0}
        }"#;
        // Unpadded dotted date in the path: that is the package version tag.
        mount(
            &server,
            "/currency-api@2024.3.6/v1/currencies/usd.json",
            ResponseTemplate::new(200).set_body_string(body),
        )
        .await;

        let source = CurrencyApiSource::new(&server.uri()).unwrap();
        let snapshot = source
            .fetch(&query("usd", 2024, 3, 6))
            .await
            .unwrap()
            .expect("expected a snapshot");

        assert_eq!(snapshot.date, "2024-03-06");
        let rates = snapshot.rates("usd").unwrap();
        assert_eq!(rates["eur"], "0.92".parse().unwrap());
        assert_eq!(rates["gbp"], "0.79".parse().unwrap());
    }

    #[tokio::test]
    async fn test_not_found_is_not_an_error() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/currency-api@2024.3.6/v1/currencies/usd.json",
            ResponseTemplate::new(404),
        )
        .await;

        let source = CurrencyApiSource::new(&server.uri()).unwrap();
        let outcome = source.fetch(&query("usd", 2024, 3, 6)).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_a_transport_failure() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/currency-api@2024.3.6/v1/currencies/usd.json",
            ResponseTemplate::new(500),
        )
        .await;

        let source = CurrencyApiSource::new(&server.uri()).unwrap();
        let err = source.fetch(&query("usd", 2024, 3, 6)).await.unwrap_err();
        assert!(
            matches!(err, RateError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_a_transport_failure() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/currency-api@2024.3.6/v1/currencies/usd.json",
            ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
        )
        .await;

        let source = CurrencyApiSource::new(&server.uri()).unwrap();
        let err = source.fetch(&query("usd", 2024, 3, 6)).await.unwrap_err();
        assert!(
            matches!(err, RateError::Payload(_)),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn test_currency_code_addresses_its_own_document() {
        let server = MockServer::start().await;
        mount(
            &server,
            "/currency-api@2024.12.31/v1/currencies/eur.json",
            ResponseTemplate::new(200)
                .set_body_string(r#"{"date": "2024-12-31", "eur": {"usd": 1.04}}"#),
        )
        .await;

        let source = CurrencyApiSource::new(&server.uri()).unwrap();
        let snapshot = source
            .fetch(&query("EUR", 2024, 12, 31))
            .await
            .unwrap()
            .expect("expected a snapshot");
        assert_eq!(snapshot.rates("eur").unwrap()["usd"], "1.04".parse().unwrap());
    }
}
