use super::types::UpstreamSearchResponse;
use super::RadioSearch;
use crate::config::UpstreamConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Path of the combined station/podcast search endpoint
pub const SEARCH_PATH: &str = "new_combo_search.php";

/// HTTP client for the radio directory search API
#[derive(Debug, Clone)]
pub struct RadioDirectoryClient {
    client: Client,
    endpoint: Url,
}

impl RadioDirectoryClient {
    /// Create a new client from upstream settings
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::Service(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: Self::endpoint_for(&config.base_url)?,
        })
    }

    fn endpoint_for(base_url: &str) -> Result<Url> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|base| base.join(SEARCH_PATH))
            .map_err(|e| Error::Service(format!("Invalid upstream base URL '{base_url}': {e}")))
    }

    /// Full request URL with the percent-encoded search text
    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(Some(&format!("srch={}", urlencoding::encode(query))));
        url
    }
}

#[async_trait]
impl RadioSearch for RadioDirectoryClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<UpstreamSearchResponse> {
        let url = self.search_url(query);
        debug!("Upstream search URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            error!("Upstream request failed: {}", e);
            Error::UpstreamUnavailable(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Upstream returned HTTP {}", status);
            return Err(Error::UpstreamUnavailable(format!(
                "upstream search returned HTTP {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::UpstreamUnavailable(format!("Failed to read response: {e}")))?;

        let parsed: UpstreamSearchResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::UpstreamMalformed(e.to_string()))?;

        info!(
            "Upstream search completed: {} groups for '{}'",
            parsed.groups().len(),
            query
        );
        Ok(parsed)
    }
}
