use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::core::rates::{ExchangeRateProvider, ExchangeRates};

/// Client for the `/ExchangeRates` REST service.
pub struct RatesApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl RatesApiProvider {
    pub fn new(base_url: &str, accept_invalid_certs: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrates/1.0")
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(RatesApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        debug!(status = %response.status(), "Received response");

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} URL: {}", response.status(), url));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response from {}: {}", url, e))
    }
}

#[async_trait]
impl ExchangeRateProvider for RatesApiProvider {
    #[instrument(name = "CurrenciesFetch", skip(self))]
    async fn fetch_currencies(&self) -> Result<Vec<String>> {
        self.get_json("/ExchangeRates/currencies").await
    }

    #[instrument(
        name = "RatesFetch",
        skip(self),
        fields(base_currency = %base_currency)
    )]
    async fn fetch_rates(&self, base_currency: &str) -> Result<ExchangeRates> {
        let endpoint = format!("/ExchangeRates/exchange_rates/{base_currency}");
        self.get_json(&endpoint).await
    }
}
