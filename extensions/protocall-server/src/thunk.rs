//! Adapters from a service method's declared shape to the four handler
//! shapes the hosting runtime calls.
//!
//! Everything that depends on the method's shape is resolved once when the
//! handler is built. At call time a handler only assembles the argument list
//! and converts the method's return value.

use futures::{
    FutureExt, StreamExt, TryFutureExt,
    future::{self, BoxFuture},
    stream,
};
use protocall::{
    AnyValue, Args, CallContext, CallKind, CancellationToken, ClientStreamingServerMethod,
    ContextKind, ContractError, ContractOperation, DuplexStreamingServerMethod, ErasedFuture,
    ErasedStream, Erasure, Invoker, MethodSignature, RpcError, ServerCallContext,
    ServerStreamingServerMethod, StreamReader, StreamWriter, UnaryServerMethod, erase,
    with_cancellation,
};
use std::sync::Arc;

/// A bound method in the handler shape of its call kind.
pub enum ServerHandler<S> {
    Unary(UnaryServerMethod<S>),
    ClientStreaming(ClientStreamingServerMethod<S>),
    ServerStreaming(ServerStreamingServerMethod<S>),
    DuplexStreaming(DuplexStreamingServerMethod<S>),
}

impl<S> ServerHandler<S> {
    pub fn call_kind(&self) -> CallKind {
        match self {
            ServerHandler::Unary(_) => CallKind::Unary,
            ServerHandler::ClientStreaming(_) => CallKind::ClientStreaming,
            ServerHandler::ServerStreaming(_) => CallKind::ServerStreaming,
            ServerHandler::DuplexStreaming(_) => CallKind::DuplexStreaming,
        }
    }
}

impl<S> Clone for ServerHandler<S> {
    fn clone(&self) -> Self {
        match self {
            ServerHandler::Unary(h) => ServerHandler::Unary(h.clone()),
            ServerHandler::ClientStreaming(h) => ServerHandler::ClientStreaming(h.clone()),
            ServerHandler::ServerStreaming(h) => ServerHandler::ServerStreaming(h.clone()),
            ServerHandler::DuplexStreaming(h) => ServerHandler::DuplexStreaming(h.clone()),
        }
    }
}

impl<S> std::fmt::Debug for ServerHandler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ServerHandler::{}", self.call_kind())
    }
}

/// How the call context reaches the method.
#[derive(Clone, Copy)]
enum ContextArg {
    Omitted,
    Server,
    Unified,
}

impl ContextArg {
    fn of(operation: &ContractOperation) -> Result<Self, ContractError> {
        match operation.context_kind() {
            ContextKind::None => Ok(ContextArg::Omitted),
            ContextKind::ServerContext => Ok(ContextArg::Server),
            ContextKind::UnifiedContext => Ok(ContextArg::Unified),
            ContextKind::PlainOptions => Err(ContractError::UnsupportedShape {
                method: operation.source_method().name,
                reason: "CallOptions parameters are only available to clients",
            }),
        }
    }

    fn push(self, args: &mut Args, context: ServerCallContext) {
        match self {
            ContextArg::Omitted => {}
            ContextArg::Server => args.push(erase(context)),
            ContextArg::Unified => args.push(erase(CallContext::server(context))),
        }
    }
}

/// How the method's return value becomes the handler's result.
#[derive(Clone, Copy)]
enum Completion {
    /// A bare value; the call is already complete.
    Value,
    Fallible(fn(AnyValue) -> Result<Result<AnyValue, RpcError>, RpcError>),
    Deferred(fn(AnyValue) -> Result<ErasedFuture, RpcError>),
    Stream(fn(AnyValue) -> Result<ErasedStream, RpcError>),
}

impl Completion {
    fn of(method: &MethodSignature) -> Result<Self, ContractError> {
        match method.returns.erasure() {
            None => Ok(Completion::Value),
            Some(Erasure::Fallible(unwrap)) => Ok(Completion::Fallible(unwrap)),
            Some(Erasure::Deferred(to_future)) => Ok(Completion::Deferred(to_future)),
            Some(Erasure::Stream(to_stream)) => Ok(Completion::Stream(to_stream)),
            Some(Erasure::Reader { .. } | Erasure::Writer { .. }) => {
                Err(ContractError::UnsupportedShape {
                    method: method.name,
                    reason: "stream readers and writers cannot be returned",
                })
            }
        }
    }

    fn into_future(self, value: AnyValue) -> ErasedFuture {
        match self {
            Completion::Value => future::ready(Ok(value)).boxed(),
            Completion::Fallible(unwrap) => future::ready(unwrap(value).and_then(|r| r)).boxed(),
            Completion::Deferred(to_future) => to_future(value).unwrap_or_else(failed),
            Completion::Stream(_) => failed(RpcError::invalid_operation(
                "a response stream cannot complete a single-response call",
            )),
        }
    }
}

/// How a streaming method delivers its responses.
#[derive(Clone, Copy)]
enum Responder {
    /// Writes through a `StreamWriter` parameter, finishing with its task.
    Writer {
        wrap: fn(StreamWriter<AnyValue>) -> AnyValue,
        completion: Completion,
    },
    /// Returns a `ResponseStream`, which is pumped into the runtime's writer.
    Stream(fn(AnyValue) -> Result<ErasedStream, RpcError>),
}

impl Responder {
    fn of(operation: &ContractOperation) -> Result<Self, ContractError> {
        let method = operation.source_method();
        let completion = Completion::of(method)?;

        if operation.has_response_writer() {
            return match method.params.get(1).and_then(|p| p.erasure()) {
                Some(Erasure::Writer { wrap }) => Ok(Responder::Writer { wrap, completion }),
                _ => Err(ContractError::UnsupportedShape {
                    method: method.name,
                    reason: "the second parameter is not a StreamWriter",
                }),
            };
        }

        match completion {
            Completion::Stream(to_stream) => Ok(Responder::Stream(to_stream)),
            _ => Err(ContractError::UnsupportedShape {
                method: method.name,
                reason: "streaming responses need a StreamWriter parameter or a ResponseStream",
            }),
        }
    }

    fn respond<S>(
        self,
        service: &S,
        invoker: &Invoker<S>,
        mut args: Args,
        responses: StreamWriter<AnyValue>,
        context: ContextArg,
        call: ServerCallContext,
    ) -> BoxFuture<'static, Result<(), RpcError>> {
        let token = call.cancellation_token.clone();
        match self {
            Responder::Writer { wrap, completion } => {
                args.push(wrap(responses));
                context.push(&mut args, call);
                match invoker(service, args) {
                    Ok(value) => completion.into_future(value).map_ok(|_| ()).boxed(),
                    Err(error) => future::ready(Err(error)).boxed(),
                }
            }
            Responder::Stream(to_stream) => {
                context.push(&mut args, call);
                match invoker(service, args).and_then(to_stream) {
                    Ok(stream) => pump(stream, responses, token).boxed(),
                    Err(error) => future::ready(Err(error)).boxed(),
                }
            }
        }
    }
}

fn failed(error: RpcError) -> ErasedFuture {
    future::ready(Err(error)).boxed()
}

fn reader_wrap(
    method: &MethodSignature,
) -> Result<fn(StreamReader<AnyValue>) -> AnyValue, ContractError> {
    match method.params.first().and_then(|p| p.erasure()) {
        Some(Erasure::Reader { wrap, .. }) => Ok(wrap),
        _ => Err(ContractError::UnsupportedShape {
            method: method.name,
            reason: "the request parameter is not a StreamReader",
        }),
    }
}

/// Ends `requests` with `RpcError::Cancelled` once the call is cancelled.
fn cancellable(
    requests: StreamReader<AnyValue>,
    token: CancellationToken,
) -> StreamReader<AnyValue> {
    StreamReader::new(stream::unfold(Some((requests, token)), |state| async move {
        let Some((mut requests, token)) = state else {
            return None;
        };
        match with_cancellation(token.clone(), requests.next().map(Ok)).await {
            Ok(Some(item)) => Some((item, Some((requests, token)))),
            Ok(None) => None,
            Err(error) => Some((Err(error), None)),
        }
    }))
}

/// Forwards every item of `responses` into `writer` until the stream ends,
/// an item fails, or the call is cancelled.
async fn pump(
    mut responses: ErasedStream,
    mut writer: StreamWriter<AnyValue>,
    token: CancellationToken,
) -> Result<(), RpcError> {
    while let Some(item) = with_cancellation(token.clone(), responses.next().map(Ok)).await? {
        writer.write(item?).await?;
    }
    Ok(())
}

/// Builds the runtime handler for `operation`, calling into the service
/// through `invoker`.
pub fn server_handler<S: 'static>(
    operation: &ContractOperation,
    invoker: Invoker<S>,
) -> Result<ServerHandler<S>, ContractError> {
    let method = operation.source_method();
    let context = ContextArg::of(operation)?;

    let handler = match operation.call_kind() {
        CallKind::Unary => {
            let completion = Completion::of(method)?;
            ServerHandler::Unary(Arc::new(
                move |service: &S, request: AnyValue, call: ServerCallContext| {
                    let mut args = Args::new();
                    args.push(request);
                    context.push(&mut args, call);
                    match invoker(service, args) {
                        Ok(value) => completion.into_future(value),
                        Err(error) => failed(error),
                    }
                },
            ))
        }
        CallKind::ClientStreaming => {
            let completion = Completion::of(method)?;
            let wrap = reader_wrap(method)?;
            ServerHandler::ClientStreaming(Arc::new(
                move |service: &S, requests: StreamReader<AnyValue>, call: ServerCallContext| {
                    let requests = cancellable(requests, call.cancellation_token.clone());
                    let mut args = Args::new();
                    args.push(wrap(requests));
                    context.push(&mut args, call);
                    match invoker(service, args) {
                        Ok(value) => completion.into_future(value),
                        Err(error) => failed(error),
                    }
                },
            ))
        }
        CallKind::ServerStreaming => {
            let responder = Responder::of(operation)?;
            ServerHandler::ServerStreaming(Arc::new(
                move |service: &S,
                      request: AnyValue,
                      responses: StreamWriter<AnyValue>,
                      call: ServerCallContext| {
                    let mut args = Args::new();
                    args.push(request);
                    responder.respond(service, &invoker, args, responses, context, call)
                },
            ))
        }
        CallKind::DuplexStreaming => {
            let responder = Responder::of(operation)?;
            let wrap = reader_wrap(method)?;
            ServerHandler::DuplexStreaming(Arc::new(
                move |service: &S,
                      requests: StreamReader<AnyValue>,
                      responses: StreamWriter<AnyValue>,
                      call: ServerCallContext| {
                    let requests = cancellable(requests, call.cancellation_token.clone());
                    let mut args = Args::new();
                    args.push(wrap(requests));
                    responder.respond(service, &invoker, args, responses, context, call)
                },
            ))
        }
    };

    Ok(handler)
}
