//! Domainr status API client (via RapidAPI).

use async_trait::async_trait;
use domainforge_error::{DomainforgeResult, ProviderError, ProviderErrorKind};
use domainforge_interface::AvailabilityLookup;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Status endpoint.
pub const DOMAINR_ENDPOINT: &str = "https://domainr.p.rapidapi.com/v2/status";

const RAPIDAPI_HOST: &str = "domainr.p.rapidapi.com";

/// Status response body.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    /// One entry per queried domain
    #[serde(default)]
    pub status: Vec<DomainStatus>,
}

/// Registry status of one domain.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DomainStatus {
    /// Domain queried
    #[serde(default)]
    pub domain: String,
    /// Status summary (e.g. "active", "inactive", "undelegated")
    #[serde(default)]
    pub status: String,
}

impl StatusResponse {
    /// Availability according to the first status entry.
    ///
    /// Only `inactive` and `undelegated` count as available. An empty status
    /// list counts as taken.
    ///
    /// # Examples
    ///
    /// ```
    /// use domainforge_domains::StatusResponse;
    ///
    /// let body: StatusResponse =
    ///     serde_json::from_str(r#"{"status":[{"domain":"x.com","status":"undelegated"}]}"#).unwrap();
    /// assert!(body.is_available());
    /// ```
    pub fn is_available(&self) -> bool {
        self.status
            .first()
            .is_some_and(|s| matches!(s.status.as_str(), "inactive" | "undelegated"))
    }
}

/// Domainr client.
#[derive(Debug, Clone)]
pub struct DomainrClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl DomainrClient {
    /// Creates a client from `RAPIDAPI_KEY` or `DOMAINR_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if neither variable is set.
    #[instrument]
    pub fn new() -> DomainforgeResult<Self> {
        let api_key = ["RAPIDAPI_KEY", "DOMAINR_API_KEY"]
            .iter()
            .filter_map(|k| std::env::var(k).ok())
            .find(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::new(
                    "domainr",
                    ProviderErrorKind::MissingApiKey("DOMAINR_API_KEY".to_string()),
                )
            })?;
        Ok(Self::with_api_key(api_key))
    }

    /// Creates a client with an explicit RapidAPI key.
    pub fn with_api_key(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            endpoint: DOMAINR_ENDPOINT.to_string(),
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn error(kind: ProviderErrorKind) -> ProviderError {
        ProviderError::new("domainr", kind)
    }
}

#[async_trait]
impl AvailabilityLookup for DomainrClient {
    #[instrument(skip(self))]
    async fn is_available(&self, domain: &str) -> DomainforgeResult<bool> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("domain", domain)])
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .send()
            .await
            .map_err(|e| Self::error(ProviderErrorKind::Http(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Self::error(ProviderErrorKind::Api {
                status: status.as_u16(),
                message,
            })
            .into());
        }

        let body: StatusResponse = response
            .json()
            .await
            .map_err(|e| Self::error(ProviderErrorKind::ResponseParsing(e.to_string())))?;

        let available = body.is_available();
        debug!(
            status = body.status.first().map(|s| s.status.as_str()).unwrap_or(""),
            available,
            "Domainr status"
        );
        Ok(available)
    }

    fn provider_name(&self) -> &'static str {
        "domainr"
    }
}
