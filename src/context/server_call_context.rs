use super::{Metadata, WriteOptions};
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Server-side view of an incoming call, supplied by the hosting runtime.
#[derive(Debug, Clone, Default)]
pub struct ServerCallContext {
    pub method: String,
    pub peer: String,
    pub request_headers: Metadata,
    pub deadline: Option<DateTime<Utc>>,
    pub cancellation_token: CancellationToken,
    pub write_options: Option<WriteOptions>,
}

impl ServerCallContext {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    pub fn with_peer(mut self, peer: impl Into<String>) -> Self {
        self.peer = peer.into();
        self
    }

    pub fn with_request_headers(mut self, headers: Metadata) -> Self {
        self.request_headers = headers;
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }
}
