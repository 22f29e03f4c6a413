//! HTTP client for the history (DB reader) service.

use reqwest::Client;

use verdant_types::HistoryRecord;

use crate::error::Result;
use crate::transport::Transport;
use crate::wire;

/// HTTP client for the read-only history record set.
#[derive(Debug, Clone)]
pub struct HistoryClient {
    transport: Transport,
}

impl HistoryClient {
    /// Create a client for the DB reader service base URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            transport: Transport::new(base_url)?,
        })
    }

    /// Create a client with a caller-provided [`reqwest::Client`].
    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        Ok(Self {
            transport: Transport::with_client(base_url, client)?,
        })
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    /// Fetch the full history record set.
    ///
    /// The backend returns either a bare array or a `{"data": {...}}` keyed
    /// object; both shapes normalize to the same record list. Records are
    /// immutable once fetched; pagination and filtering happen client-side.
    pub async fn all_records(&self) -> Result<Vec<HistoryRecord>> {
        let body = self
            .transport
            .get_value("/DBreader/getAllHistoryData")
            .await?;
        Ok(wire::history_from_body(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HistoryClient::new("http://127.0.0.1:8083/").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8083");
    }
}
