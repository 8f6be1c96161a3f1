//! The shared HTTP client every resource module sends through.
//!
//! Authentication and identification headers are baked into the client's default
//! header map at construction, so no request can leave without them.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ErrorEnvelope, OpenCloudError, Result};

/// Sent as `User-Agent` on every request.
pub const USER_AGENT_VALUE: &str = concat!("rbx-open-cloud/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

pub struct Transport {
    http: Client,
    base_url: String,
    config: ClientConfig,
}

impl Transport {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|e| OpenCloudError::Config(format!("invalid API key: {e}")))?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(API_KEY_HEADER, api_key);

        let http = Client::builder().default_headers(headers).build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URL for a path relative to the base origin.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    /// Sends a request and applies the error mapping shared by every operation:
    ///
    /// - 2xx: `Ok(Some(response))`
    /// - non-2xx with an error envelope body: `Err(OpenCloudError::Api(envelope))`
    /// - non-2xx with any other JSON body: `Err(OpenCloudError::Status { .. })`
    /// - no response, or an empty or non-JSON body: `Ok(None)`
    ///
    /// A request that cannot be built is also a hard error.
    pub async fn dispatch(&self, request: RequestBuilder) -> Result<Option<Response>> {
        let request = request.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending Open Cloud request");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, %path, error = %e, "Open Cloud request failed without a response");
                return Ok(None);
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(Some(response));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(%method, %path, status = status.as_u16(), error = %e, "failed to read error body");
                return Ok(None);
            }
        };

        if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(&body) {
            warn!(%method, %path, status = status.as_u16(), code = %envelope.code, "Open Cloud request rejected");
            return Err(OpenCloudError::Api(envelope));
        }

        match serde_json::from_slice::<serde_json::Value>(&body) {
            Ok(body) => {
                warn!(
                    %method,
                    %path,
                    status = status.as_u16(),
                    "Open Cloud request rejected with a non-envelope body"
                );
                Err(OpenCloudError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(_) => {
                warn!(
                    %method,
                    %path,
                    status = status.as_u16(),
                    "Open Cloud request failed without a JSON body"
                );
                Ok(None)
            }
        }
    }

    /// [`dispatch`](Self::dispatch), then decodes a successful body as JSON.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let Some(response) = self.dispatch(request).await? else {
            return Ok(None);
        };
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to read Open Cloud response body");
                return Ok(None);
            }
        };
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// [`dispatch`](Self::dispatch) for operations with no success payload.
    ///
    /// A failure without a JSON body is indistinguishable from success here.
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.dispatch(request).await.map(|_| ())
    }
}
