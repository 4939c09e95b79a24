use super::{MethodSignature, TypeDesc};
use crate::MethodReference;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Unary,
    ClientStreaming,
    ServerStreaming,
    DuplexStreaming,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Which context parameter, if any, trails the payload parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    None,
    /// A client-side `CallOptions`.
    PlainOptions,
    /// A `CallContext`, usable from either side.
    UnifiedContext,
    /// A server-side `ServerCallContext`.
    ServerContext,
}

/// How a method hands back its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseShape {
    /// A plain value, or `Result<T, RpcError>`.
    Sync,
    /// A `Task<T>`.
    Deferred,
    /// A `ValueTask<T>`.
    LightDeferred,
    /// A `ResponseStream<T>`.
    Streamed,
}

/// One classified contract method.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractOperation {
    name: String,
    request_type: TypeDesc,
    response_type: TypeDesc,
    call_kind: CallKind,
    context_kind: ContextKind,
    response_shape: ResponseShape,
    response_writer: bool,
    source_method: MethodSignature,
}

/// Result of matching a signature against the call-shape rules.
#[derive(Debug, Clone, PartialEq)]
pub struct CallShape {
    pub call_kind: CallKind,
    pub context_kind: ContextKind,
    pub response_shape: ResponseShape,
    /// The response is written through a `StreamWriter` parameter.
    pub response_writer: bool,
    pub request_type: TypeDesc,
    pub response_type: TypeDesc,
}

impl ContractOperation {
    pub fn new(name: impl Into<String>, shape: CallShape, source_method: MethodSignature) -> Self {
        Self {
            name: name.into(),
            request_type: shape.request_type,
            response_type: shape.response_type,
            call_kind: shape.call_kind,
            context_kind: shape.context_kind,
            response_shape: shape.response_shape,
            response_writer: shape.response_writer,
            source_method,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn request_type(&self) -> &TypeDesc {
        &self.request_type
    }

    pub fn response_type(&self) -> &TypeDesc {
        &self.response_type
    }

    pub fn call_kind(&self) -> CallKind {
        self.call_kind
    }

    pub fn context_kind(&self) -> ContextKind {
        self.context_kind
    }

    pub fn response_shape(&self) -> ResponseShape {
        self.response_shape
    }

    pub fn has_response_writer(&self) -> bool {
        self.response_writer
    }

    pub fn source_method(&self) -> &MethodSignature {
        &self.source_method
    }

    pub fn method_reference(&self, service_name: &str) -> MethodReference {
        MethodReference::new(
            service_name,
            self.name.clone(),
            self.call_kind,
            self.source_method.name,
        )
    }
}

/// The operations one contract type exposes under a resolved service name.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDescriptor {
    service_name: String,
    contract_type: &'static str,
    operations: Vec<ContractOperation>,
    unmatched: Vec<&'static str>,
}

impl ServiceDescriptor {
    pub fn new(
        service_name: String,
        contract_type: &'static str,
        operations: Vec<ContractOperation>,
        unmatched: Vec<&'static str>,
    ) -> Self {
        Self {
            service_name,
            contract_type,
            operations,
            unmatched,
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn contract_type(&self) -> &'static str {
        self.contract_type
    }

    pub fn operations(&self) -> &[ContractOperation] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&ContractOperation> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Eligible methods whose signature matched no call shape.
    pub fn unmatched_methods(&self) -> &[&'static str] {
        &self.unmatched
    }
}
