use super::RpcMethod;
use crate::{
    AnyValue, ContractError, EndpointMetadata, ErasedFuture, RpcError, ServerCallContext,
    StreamReader, StreamWriter,
};
use futures::future::BoxFuture;
use std::sync::Arc;

pub type UnaryServerMethod<S> =
    Arc<dyn Fn(&S, AnyValue, ServerCallContext) -> ErasedFuture + Send + Sync>;

pub type ClientStreamingServerMethod<S> =
    Arc<dyn Fn(&S, StreamReader<AnyValue>, ServerCallContext) -> ErasedFuture + Send + Sync>;

pub type ServerStreamingServerMethod<S> = Arc<
    dyn Fn(
            &S,
            AnyValue,
            StreamWriter<AnyValue>,
            ServerCallContext,
        ) -> BoxFuture<'static, Result<(), RpcError>>
        + Send
        + Sync,
>;

pub type DuplexStreamingServerMethod<S> = Arc<
    dyn Fn(
            &S,
            StreamReader<AnyValue>,
            StreamWriter<AnyValue>,
            ServerCallContext,
        ) -> BoxFuture<'static, Result<(), RpcError>>
        + Send
        + Sync,
>;

/// Registration surface the hosting runtime exposes for service `S`.
///
/// The runtime owns the service instances and the wire; it invokes the
/// registered handlers with decoded requests.
pub trait ServiceMethodRegistrar<S> {
    fn add_unary_method(
        &mut self,
        method: RpcMethod,
        metadata: EndpointMetadata,
        handler: UnaryServerMethod<S>,
    );

    fn add_client_streaming_method(
        &mut self,
        method: RpcMethod,
        metadata: EndpointMetadata,
        handler: ClientStreamingServerMethod<S>,
    );

    fn add_server_streaming_method(
        &mut self,
        method: RpcMethod,
        metadata: EndpointMetadata,
        handler: ServerStreamingServerMethod<S>,
    );

    fn add_duplex_streaming_method(
        &mut self,
        method: RpcMethod,
        metadata: EndpointMetadata,
        handler: DuplexStreamingServerMethod<S>,
    );
}

/// Invoked by the hosting runtime once per service type while it discovers
/// the methods it should serve.
pub trait ServiceMethodProvider<S>: Send + Sync {
    /// Registers every method this provider knows for `S`; returns how many.
    fn on_service_method_discovery(
        &self,
        registrar: &mut dyn ServiceMethodRegistrar<S>,
    ) -> Result<usize, ContractError>;
}
