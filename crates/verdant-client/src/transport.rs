//! Shared HTTP plumbing for the service clients.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// Default request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// A base URL plus a configured [`reqwest::Client`].
///
/// All three service clients (registry, controller, history) wrap one of
/// these; the per-endpoint differences live entirely in the callers.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    /// Create a transport for a base URL (e.g. `http://127.0.0.1:8081`).
    pub(crate) fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Request)?;
        Self::with_client(base_url, client)
    }

    /// Create a transport with a caller-provided client.
    pub(crate) fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {}",
                base_url
            )));
        }

        Ok(Self { client, base_url })
    }

    /// The normalized base URL.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a path and return the parsed JSON body.
    pub(crate) async fn get_value(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        Self::handle_response(response).await
    }

    /// POST a JSON body to a path and return the parsed JSON response.
    pub(crate) async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::NotReachable {
                url: url.clone(),
                source: e,
            })?;

        Self::handle_response(response).await
    }

    async fn handle_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(Error::Request)
        } else {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .or_else(|| v.get("message"))
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or_else(|| status.to_string());

            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_normalizes_url() {
        let t = Transport::new("http://localhost:8081/").unwrap();
        assert_eq!(t.base_url(), "http://localhost:8081");
    }

    #[test]
    fn test_transport_rejects_bare_host() {
        let result = Transport::new("localhost:8081");
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
