/*
[INPUT]:  HTTP configuration (base URL, timeouts) and an injected request signer
[OUTPUT]: Configured reqwest client ready for API calls and page fetches
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use tracing::{debug, warn};

use super::error::{GdaxError, Result};
use super::signature::{NoAuth, RequestSigner, SigningInput};
use crate::pagination::{PageFetcher, PageRequest, RawPage};
use crate::types::ApiErrorBody;

/// Base URL for the GDAX REST API
const BASE_URL: &str = "https://api.gdax.com";
const USER_AGENT: &str = concat!("gdax-adapter/", env!("CARGO_PKG_VERSION"));

const BEFORE_HEADER: &str = "cb-before";
const AFTER_HEADER: &str = "cb-after";

const BASE_URL_ENV: &str = "GDAX_BASE_URL";
const TIMEOUT_ENV: &str = "GDAX_TIMEOUT_SECS";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `GDAX_BASE_URL` and `GDAX_TIMEOUT_SECS` when set
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with variables read through `lookup`
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.parse::<u64>().map_err(|_| {
                GdaxError::Config(format!("{TIMEOUT_ENV} must be whole seconds, got `{raw}`"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Main HTTP client for the GDAX REST API
///
/// Cheap to clone; every listing cursor owns a clone.
#[derive(Debug, Clone)]
pub struct GdaxClient {
    http_client: Client,
    base_url: Url,
    signer: Arc<dyn RequestSigner>,
}

impl GdaxClient {
    /// Create an unauthenticated client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create an unauthenticated client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_signer(config, Arc::new(NoAuth))
    }

    /// Create a client whose requests are signed by `signer`
    pub fn with_signer(config: ClientConfig, signer: Arc<dyn RequestSigner>) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(&config.base_url)?,
            signer,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint with its query string
    fn url(&self, endpoint: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self.base_url.join(endpoint)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn signed_headers(&self, method: &Method, url: &Url, body: &str) -> Result<HeaderMap> {
        let request_path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let input = SigningInput {
            method,
            request_path: &request_path,
            body,
            timestamp: Utc::now().timestamp(),
        };

        let mut headers = HeaderMap::new();
        for (name, value) in self.signer.sign(&input)? {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GdaxError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| GdaxError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    /// Send a signed request and map non-2xx statuses to [`GdaxError::Api`]
    pub(crate) async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<Response> {
        let url = self.url(endpoint, query)?;
        let headers = self.signed_headers(&method, &url, "")?;

        debug!(%method, url = %url, "sending request");
        let response = self
            .http_client
            .request(method, url)
            .headers(headers)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(status = status.as_u16(), endpoint, error = %e, "failed to read error body");
                String::new()
            }
        };
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|body| body.message)
            .unwrap_or(text);
        warn!(status = status.as_u16(), endpoint, message = %message, "request rejected");
        Err(GdaxError::api_error(status, message))
    }
}

fn header_token(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl PageFetcher for GdaxClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<RawPage> {
        let response = self.send(Method::GET, &request.path, &request.query).await?;
        let before = header_token(&response, BEFORE_HEADER);
        let after = header_token(&response, AFTER_HEADER);
        let body = response.bytes().await?.to_vec();

        Ok(RawPage {
            body,
            before,
            after,
        })
    }
}
