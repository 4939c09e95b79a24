use super::RpcMethod;
use crate::{
    AnyValue, CallOptions, ErasedFuture, ErasedStream, Metadata, RpcError, Status, StatusCode,
    StreamReader,
};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};

/// Final status and trailers of a call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallCompletion {
    pub status: Status,
    pub trailers: Metadata,
}

impl CallCompletion {
    pub fn new(status: Status, trailers: Metadata) -> Self {
        Self { status, trailers }
    }
}

/// Handle to an in-flight call with a single response.
pub struct AsyncUnaryCall {
    pub response: ErasedFuture,
    /// Resolves when the server's response headers arrive.
    pub headers: BoxFuture<'static, Result<Metadata, RpcError>>,
    /// Resolves once the call has completed.
    pub completion: BoxFuture<'static, CallCompletion>,
}

impl AsyncUnaryCall {
    pub fn new(
        response: ErasedFuture,
        headers: BoxFuture<'static, Result<Metadata, RpcError>>,
        completion: BoxFuture<'static, CallCompletion>,
    ) -> Self {
        Self {
            response,
            headers,
            completion,
        }
    }

    /// A call that already finished with `response`. Headers are empty and the
    /// completion status reflects the outcome.
    pub fn ready(response: Result<AnyValue, RpcError>) -> Self {
        let status = match &response {
            Ok(_) => Status::ok(),
            Err(RpcError::Status(status)) => status.clone(),
            Err(RpcError::Cancelled) => Status::cancelled(""),
            Err(e) => Status::new(StatusCode::Unknown, e.to_string()),
        };
        Self::new(
            future::ready(response).boxed(),
            future::ready(Ok(Metadata::new())).boxed(),
            future::ready(CallCompletion::new(status, Metadata::new())).boxed(),
        )
    }
}

/// Handle to an in-flight call with a stream of responses.
pub struct AsyncStreamingCall {
    pub responses: ErasedStream,
    pub headers: BoxFuture<'static, Result<Metadata, RpcError>>,
    pub completion: BoxFuture<'static, CallCompletion>,
}

impl AsyncStreamingCall {
    pub fn new(
        responses: ErasedStream,
        headers: BoxFuture<'static, Result<Metadata, RpcError>>,
        completion: BoxFuture<'static, CallCompletion>,
    ) -> Self {
        Self {
            responses,
            headers,
            completion,
        }
    }

    /// A call whose responses are `responses`, with empty headers and an OK status.
    pub fn from_stream(responses: ErasedStream) -> Self {
        Self::new(
            responses,
            future::ready(Ok(Metadata::new())).boxed(),
            future::ready(CallCompletion::default()).boxed(),
        )
    }
}

/// The client transport: issues calls for a given method.
///
/// `host` is an optional authority override; generated proxies always pass
/// `None`. Request values are erased payloads whose concrete type matches
/// `method.request_marshaller`.
pub trait CallInvoker: Send + Sync {
    fn async_unary_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        request: AnyValue,
    ) -> AsyncUnaryCall;

    fn async_client_streaming_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        requests: StreamReader<AnyValue>,
    ) -> AsyncUnaryCall;

    fn async_server_streaming_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        request: AnyValue,
    ) -> AsyncStreamingCall;

    fn async_duplex_streaming_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        requests: StreamReader<AnyValue>,
    ) -> AsyncStreamingCall;
}
