use crate::config::Config;
use crate::error::{Error, Result};
use crate::http;
use crate::types::{ApiResponse, Bill, Chamber, ListView, Member};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Read-only access to bill records and chamber rosters
#[async_trait]
pub trait LegislativeSource: Send + Sync {
    /// Fetch the current snapshot of one bill
    async fn fetch_bill(&self, label: &str) -> Result<Bill>;

    /// Fetch every roster entry for a chamber in the configured session.
    /// `full` asks for extended profile fields.
    async fn fetch_roster(&self, chamber: Chamber, full: bool) -> Result<Vec<Member>>;
}

/// OpenLegislation HTTP client
pub struct OpenLegClient {
    client: Client,
    config: Config,
}

impl OpenLegClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = http::build_client(&config.http)?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.openleg.base_url.trim_end_matches('/'),
            path
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path);
        let response = http::send_with_retry(&self.config.http, path, || {
            self.client
                .get(&url)
                .query(&[("key", self.config.openleg.api_key.as_str()), ("limit", "1000")])
                .query(query)
        })
        .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

/// Unwrap the `{ success, message, result }` envelope into a typed record
pub fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let envelope: ApiResponse<T> = serde_json::from_str(body)?;
    match envelope.result {
        Some(result) if envelope.success => Ok(result),
        _ => Err(Error::Api {
            status,
            message: envelope
                .message
                .unwrap_or_else(|| "response carried no result".to_string()),
        }),
    }
}

#[async_trait]
impl LegislativeSource for OpenLegClient {
    async fn fetch_bill(&self, label: &str) -> Result<Bill> {
        let path = format!("bills/{}/{}", self.config.session_year, label.trim());
        tracing::debug!(label, "fetching bill");
        self.get(&path, &[]).await
    }

    async fn fetch_roster(&self, chamber: Chamber, full: bool) -> Result<Vec<Member>> {
        let path = format!(
            "members/{}/{}",
            self.config.session_year,
            chamber.as_lowercase()
        );
        tracing::debug!(%chamber, full, "fetching roster");
        let list: ListView<Member> = self.get(&path, &[("full", full.to_string())]).await?;
        Ok(list.items)
    }
}
