//! Outbound transport to provider APIs.

use async_trait::async_trait;

use crate::ProviderError;

/// A fully prepared POST: the body is already serialized (and signed, when
/// the provider wants that), so the transport must send it unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ProviderResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends prepared requests to a provider.
///
/// Non-2xx responses are returned as values, not errors; only transport
/// failures are errors here.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<ProviderResponse, ProviderError>;
}

/// `reqwest`-backed transport. Timeouts are the client defaults.
pub struct HttpProviderApi {
    http_client: reqwest::Client,
}

impl HttpProviderApi {
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
        }
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl Default for HttpProviderApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderApi for HttpProviderApi {
    async fn send(&self, request: OutboundRequest) -> Result<ProviderResponse, ProviderError> {
        let mut builder = self
            .http_client
            .post(&request.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(request.body).send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Transport(format!("request timed out: {e}"))
            } else if e.is_connect() {
                ProviderError::Transport(format!("connection failed: {e}"))
            } else {
                ProviderError::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(format!("failed to read response body: {e}")))?;

        tracing::debug!(url = %request.url, status, "provider responded");
        Ok(ProviderResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = ProviderResponse { status: 201, body: vec![] };
        let bad = ProviderResponse { status: 401, body: b"nope".to_vec() };
        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(bad.body_text(), "nope");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let api = HttpProviderApi::new();
        let err = api
            .send(OutboundRequest {
                url: "http://127.0.0.1:1/v2/session/".into(),
                headers: vec![],
                body: b"{}".to_vec(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
