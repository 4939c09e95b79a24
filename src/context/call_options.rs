use super::Metadata;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Per-message write hints passed through to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    flags: u32,
}

impl WriteOptions {
    /// The write may be buffered before it is sent.
    pub const BUFFER_HINT: u32 = 0x1;
    /// The message should not be compressed.
    pub const NO_COMPRESS: u32 = 0x2;

    pub const fn new(flags: u32) -> Self {
        Self { flags }
    }

    pub const fn flags(&self) -> u32 {
        self.flags
    }

    pub const fn contains(&self, flag: u32) -> bool {
        self.flags & flag == flag
    }
}

/// Client-side options for a single call.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub headers: Metadata,
    pub deadline: Option<DateTime<Utc>>,
    pub cancellation_token: CancellationToken,
    pub write_options: Option<WriteOptions>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: Metadata) -> Self {
        self.headers = headers;
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

    pub fn with_write_options(mut self, write_options: WriteOptions) -> Self {
        self.write_options = Some(write_options);
        self
    }
}
