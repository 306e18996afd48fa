use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::models::{CountryCodeEntry, GhoResponse, IncomeGroupEntry};

use super::{parse_country_codes, parse_income_groups};

/// Some reference hosts refuse requests without a browser user agent
const USER_AGENT: &str = "Mozilla/5.0";

/// Raw body of an indicator response alongside its parsed form
#[derive(Debug, Clone)]
pub struct IndicatorPayload {
    pub body: String,
    pub response: GhoResponse,
}

/// HTTP client for the GHO API and the reference-table hosts
pub struct SourceClient {
    client: Client,
    api_base: String,
}

impl SourceClient {
    pub fn new(api_base: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_base: api_base.to_string(),
        })
    }

    /// Download one GHO indicator
    pub async fn fetch_indicator(&self, code: &str) -> Result<IndicatorPayload> {
        let url = format!("{}{}", self.api_base, code);
        let body = self.get_text(&url).await?;
        let response: GhoResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse GHO response for {}", code))?;
        debug!("{}: {} records", code, response.value.len());
        Ok(IndicatorPayload { body, response })
    }

    /// Download and parse the ISO country code table
    pub async fn fetch_country_codes(&self, url: &str) -> Result<Vec<CountryCodeEntry>> {
        let html = self.get_text(url).await?;
        parse_country_codes(&html)
    }

    /// Download and parse World Bank income classifications
    pub async fn fetch_income_groups(&self, url: &str) -> Result<Vec<IncomeGroupEntry>> {
        let body = self.get_text(url).await?;
        parse_income_groups(&body)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Request to {} failed: {} - {}", url, status, body);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }
}
