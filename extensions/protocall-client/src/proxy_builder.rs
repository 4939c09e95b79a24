use crate::reshape;
use protocall::{
    AnyValue, Args, CallContext, CallInvoker, CallKind, CallOptions, CallOutcome, ClientThunk,
    ContextKind, ContractDefinition, ContractError, ContractOperation, DispatchTable, Erasure,
    MarshallerCache, MetadataCapture, RpcError, RpcMethod, StreamReader, inspect,
};
use std::sync::Arc;

type ReaderUnwrap = fn(AnyValue) -> Result<StreamReader<AnyValue>, RpcError>;

/// Builds the dispatch table for an interface contract.
///
/// Every declared method gets an entry: classified and bindable operations
/// issue calls, all others fail fast with [`RpcError::Unsupported`].
pub fn build_dispatch_table(
    definition: &ContractDefinition,
    marshallers: &MarshallerCache,
) -> Result<DispatchTable, ContractError> {
    if !definition.info.is_interface() {
        return Err(ContractError::NotAnInterface(definition.info.type_name));
    }

    let descriptor = inspect(definition)?;
    let service_name = descriptor.service_name();
    let mut table = DispatchTable::new(service_name);

    for operation in descriptor.operations() {
        let method = operation.source_method().name;
        let thunk = match bind_operation(service_name, operation, marshallers) {
            Ok(thunk) => {
                tracing::debug!(
                    "Bound client method {} to {} ({})",
                    method,
                    operation.method_reference(service_name).full_name(),
                    operation.call_kind()
                );
                thunk
            }
            Err(error) => {
                tracing::warn!("Unable to bind client method {}: {}", method, error);
                unsupported(format!("{}: {}", method, error))
            }
        };
        table.insert(method, thunk);
    }

    for &method in descriptor.unmatched_methods() {
        table.insert(
            method,
            unsupported(format!("{}: signature matches no call shape", method)),
        );
    }

    Ok(table)
}

fn unsupported(message: String) -> ClientThunk {
    Arc::new(move |_: &dyn CallInvoker, _: Args| {
        CallOutcome::failed(RpcError::unsupported(message.clone()))
    })
}

fn bind_operation(
    service_name: &str,
    operation: &ContractOperation,
    marshallers: &MarshallerCache,
) -> Result<ClientThunk, ContractError> {
    let method_name = operation.source_method().name;
    if operation.has_response_writer() {
        return Err(ContractError::UnsupportedShape {
            method: method_name,
            reason: "response writer parameters are only available to servers",
        });
    }

    let context_kind = operation.context_kind();
    if context_kind == ContextKind::ServerContext {
        return Err(ContractError::UnsupportedShape {
            method: method_name,
            reason: "ServerCallContext parameters are only available to servers",
        });
    }

    let method = Arc::new(RpcMethod::resolve(
        operation.method_reference(service_name),
        operation.request_type(),
        operation.response_type(),
        marshallers,
    )?);
    let response_shape = operation.response_shape();

    let thunk: ClientThunk = match operation.call_kind() {
        CallKind::Unary => Arc::new(move |invoker: &dyn CallInvoker, mut args: Args| {
            issue(|| {
                let request = args.take_any()?;
                let (options, capture) = call_options(context_kind, &mut args)?;
                let token = options.cancellation_token.clone();
                let call = invoker.async_unary_call(&method, None, options, request);
                Ok(reshape::unary(call, response_shape, capture, token))
            })
        }),
        CallKind::ClientStreaming => {
            let unwrap_reader = reader_unwrap(operation)?;
            Arc::new(move |invoker: &dyn CallInvoker, mut args: Args| {
                issue(|| {
                    let requests = unwrap_reader(args.take_any()?)?;
                    let (options, capture) = call_options(context_kind, &mut args)?;
                    let token = options.cancellation_token.clone();
                    let call = invoker.async_client_streaming_call(&method, None, options, requests);
                    Ok(reshape::unary(call, response_shape, capture, token))
                })
            })
        }
        CallKind::ServerStreaming => Arc::new(move |invoker: &dyn CallInvoker, mut args: Args| {
            issue(|| {
                let request = args.take_any()?;
                let (options, capture) = call_options(context_kind, &mut args)?;
                let token = options.cancellation_token.clone();
                let call = invoker.async_server_streaming_call(&method, None, options, request);
                Ok(reshape::streaming(call, capture, token))
            })
        }),
        CallKind::DuplexStreaming => {
            let unwrap_reader = reader_unwrap(operation)?;
            Arc::new(move |invoker: &dyn CallInvoker, mut args: Args| {
                issue(|| {
                    let requests = unwrap_reader(args.take_any()?)?;
                    let (options, capture) = call_options(context_kind, &mut args)?;
                    let token = options.cancellation_token.clone();
                    let call = invoker.async_duplex_streaming_call(&method, None, options, requests);
                    Ok(reshape::streaming(call, capture, token))
                })
            })
        }
    };

    Ok(thunk)
}

fn issue<F>(call: F) -> CallOutcome
where
    F: FnOnce() -> Result<CallOutcome, RpcError>,
{
    call().unwrap_or_else(CallOutcome::failed)
}

fn reader_unwrap(operation: &ContractOperation) -> Result<ReaderUnwrap, ContractError> {
    match operation.source_method().params.first().and_then(|p| p.erasure()) {
        Some(Erasure::Reader { unwrap, .. }) => Ok(unwrap),
        _ => Err(ContractError::UnsupportedShape {
            method: operation.source_method().name,
            reason: "the request parameter is not a StreamReader",
        }),
    }
}

/// Options for the outgoing call, plus the capture buffer a `CallContext`
/// asked for.
fn call_options(
    context_kind: ContextKind,
    args: &mut Args,
) -> Result<(CallOptions, Option<Arc<MetadataCapture>>), RpcError> {
    match context_kind {
        ContextKind::None => Ok((CallOptions::default(), None)),
        ContextKind::PlainOptions => Ok((args.take::<CallOptions>()?, None)),
        ContextKind::UnifiedContext => {
            let context = args.take::<CallContext>()?;
            Ok((context.client_options(), context.prepare()))
        }
        ContextKind::ServerContext => Err(RpcError::unsupported(
            "ServerCallContext cannot be used for outgoing calls",
        )),
    }
}
