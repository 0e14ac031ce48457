//! Nullable provider API: record outbound requests without sending them.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use idv_providers::{OutboundRequest, ProviderApi, ProviderError, ProviderResponse};

/// A provider API that records requests and replays canned responses.
///
/// Responses are consumed in order; when none are queued, `send` fails
/// with a transport error.
pub struct NullProviderApi {
    /// Every request "sent".
    requests: Mutex<Vec<OutboundRequest>>,
    /// Responses to hand out on the next `send` calls.
    responses: Mutex<VecDeque<ProviderResponse>>,
}

impl NullProviderApi {
    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue a response.
    pub fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(ProviderResponse {
            status,
            body: body.as_bytes().to_vec(),
        });
    }

    /// All requests sent so far.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for NullProviderApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderApi for NullProviderApi {
    async fn send(&self, request: OutboundRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::Transport("no canned response queued".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let api = NullProviderApi::new();
        api.respond(200, "a");
        api.respond(500, "b");
        let req = OutboundRequest {
            url: "u".into(),
            headers: vec![],
            body: vec![],
        };
        assert_eq!(api.send(req.clone()).await.unwrap().status, 200);
        assert_eq!(api.send(req.clone()).await.unwrap().status, 500);
        assert!(api.send(req).await.is_err());
        assert_eq!(api.requests().len(), 3);
    }
}
