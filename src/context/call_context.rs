use super::{CallOptions, Metadata, ServerCallContext, Status, WriteOptions};
use crate::RpcError;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallContextFlags {
    #[default]
    None,
    /// Buffer response headers, trailers and status so they can be read
    /// back from the context once the call progresses.
    CaptureMetadata,
}

#[derive(Debug, Default)]
struct CapturedMetadata {
    headers: Option<Metadata>,
    trailers: Option<Metadata>,
    status: Option<Status>,
}

/// Response metadata recorded for a client call.
///
/// Headers are written when the transport signals them; status and trailers
/// once the call has completed.
#[derive(Debug, Default)]
pub struct MetadataCapture {
    state: Mutex<CapturedMetadata>,
}

impl MetadataCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.lock() = CapturedMetadata::default();
    }

    pub fn set_headers(&self, headers: Metadata) {
        self.lock().headers = Some(headers);
    }

    pub fn set_completion(&self, status: Status, trailers: Metadata) {
        let mut state = self.lock();
        state.status = Some(status);
        state.trailers = Some(trailers);
    }

    pub fn headers(&self) -> Result<Metadata, RpcError> {
        self.lock()
            .headers
            .clone()
            .ok_or_else(|| RpcError::invalid_operation("Headers are not yet available"))
    }

    pub fn trailers(&self) -> Result<Metadata, RpcError> {
        self.lock()
            .trailers
            .clone()
            .ok_or_else(|| RpcError::invalid_operation("Trailers are not yet available"))
    }

    pub fn status(&self) -> Result<Status, RpcError> {
        self.lock()
            .status
            .clone()
            .ok_or_else(|| RpcError::invalid_operation("Status is not yet available"))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CapturedMetadata> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A single context type usable from both sides of a call.
///
/// Contract methods that take a `CallContext` can be implemented by a service
/// (which receives the `Server` variant) and called through a client proxy
/// (which is handed the `Client` variant).
#[derive(Debug, Clone)]
pub enum CallContext {
    Client {
        options: CallOptions,
        capture: Option<Arc<MetadataCapture>>,
    },
    Server(ServerCallContext),
}

impl Default for CallContext {
    fn default() -> Self {
        CallContext::client(CallOptions::default())
    }
}

impl CallContext {
    pub fn client(options: CallOptions) -> Self {
        CallContext::with_flags(options, CallContextFlags::None)
    }

    pub fn with_flags(options: CallOptions, flags: CallContextFlags) -> Self {
        let capture = match flags {
            CallContextFlags::None => None,
            CallContextFlags::CaptureMetadata => Some(Arc::new(MetadataCapture::new())),
        };
        CallContext::Client { options, capture }
    }

    pub fn server(context: ServerCallContext) -> Self {
        CallContext::Server(context)
    }

    pub fn is_server(&self) -> bool {
        matches!(self, CallContext::Server(_))
    }

    pub fn server_context(&self) -> Option<&ServerCallContext> {
        match self {
            CallContext::Server(context) => Some(context),
            CallContext::Client { .. } => None,
        }
    }

    pub fn request_headers(&self) -> &Metadata {
        match self {
            CallContext::Client { options, .. } => &options.headers,
            CallContext::Server(context) => &context.request_headers,
        }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        match self {
            CallContext::Client { options, .. } => &options.cancellation_token,
            CallContext::Server(context) => &context.cancellation_token,
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        match self {
            CallContext::Client { options, .. } => options.deadline,
            CallContext::Server(context) => context.deadline,
        }
    }

    pub fn write_options(&self) -> Option<WriteOptions> {
        match self {
            CallContext::Client { options, .. } => options.write_options,
            CallContext::Server(context) => context.write_options,
        }
    }

    /// The options an outgoing call made with this context should use.
    ///
    /// A server context propagates its deadline and cancellation to the
    /// outgoing call; its request headers are not forwarded.
    pub fn client_options(&self) -> CallOptions {
        match self {
            CallContext::Client { options, .. } => options.clone(),
            CallContext::Server(context) => CallOptions {
                headers: Metadata::new(),
                deadline: context.deadline,
                cancellation_token: context.cancellation_token.clone(),
                write_options: context.write_options,
            },
        }
    }

    /// Clears any previously captured metadata and hands back the buffer the
    /// next call should write into.
    pub fn prepare(&self) -> Option<Arc<MetadataCapture>> {
        match self {
            CallContext::Client {
                capture: Some(capture),
                ..
            } => {
                capture.reset();
                Some(capture.clone())
            }
            _ => None,
        }
    }

    /// Headers of the most recent call made with this context.
    ///
    /// Values are recorded while the call's returned future or stream is
    /// polled. Until the caller has polled it far enough for the headers to
    /// arrive, this reports them as not yet available.
    pub fn response_headers(&self) -> Result<Metadata, RpcError> {
        self.capture()?.headers()
    }

    /// Available once the call's response has been polled to completion.
    pub fn response_trailers(&self) -> Result<Metadata, RpcError> {
        self.capture()?.trailers()
    }

    pub fn response_status(&self) -> Result<Status, RpcError> {
        self.capture()?.status()
    }

    fn capture(&self) -> Result<&MetadataCapture, RpcError> {
        match self {
            CallContext::Server(_) => Err(RpcError::invalid_operation(
                "Response metadata is not available for server contexts",
            )),
            CallContext::Client { capture: None, .. } => Err(RpcError::invalid_operation(
                "The CaptureMetadata flag must be specified when creating the CallContext to enable response metadata",
            )),
            CallContext::Client {
                capture: Some(capture),
                ..
            } => Ok(capture),
        }
    }
}

impl From<CallOptions> for CallContext {
    fn from(options: CallOptions) -> Self {
        CallContext::client(options)
    }
}

impl From<ServerCallContext> for CallContext {
    fn from(context: ServerCallContext) -> Self {
        CallContext::Server(context)
    }
}
