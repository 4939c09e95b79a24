use crate::{
    CallKind, ContractError, Marshaller, MarshallerCache, TypeDesc, method_id_hash,
};
use std::fmt;

/// Identity of one operation on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodReference {
    pub service_name: String,
    pub operation_name: String,
    pub call_kind: CallKind,
    /// Rust name of the method the operation was derived from.
    pub declaring_method_name: &'static str,
}

impl MethodReference {
    pub fn new(
        service_name: impl Into<String>,
        operation_name: impl Into<String>,
        call_kind: CallKind,
        declaring_method_name: &'static str,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            operation_name: operation_name.into(),
            call_kind,
            declaring_method_name,
        }
    }

    /// `/{service}/{operation}`
    pub fn full_name(&self) -> String {
        format!("/{}/{}", self.service_name, self.operation_name)
    }

    /// Stable routing key derived from the full name.
    ///
    /// Equal to `rpc_method_id!` applied to the same full name.
    pub fn method_id(&self) -> u64 {
        method_id_hash(&self.full_name())
    }
}

impl fmt::Display for MethodReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.call_kind)
    }
}

/// A method reference with the marshallers for its request and response.
#[derive(Debug, Clone)]
pub struct RpcMethod {
    pub reference: MethodReference,
    pub request_marshaller: Marshaller,
    pub response_marshaller: Marshaller,
}

impl RpcMethod {
    /// Resolves both marshallers through `cache`.
    ///
    /// Fails when either payload type is not a message type.
    pub fn resolve(
        reference: MethodReference,
        request_type: &TypeDesc,
        response_type: &TypeDesc,
        cache: &MarshallerCache,
    ) -> Result<Self, ContractError> {
        let resolve = |desc: &TypeDesc| {
            cache
                .resolve(desc)
                .ok_or_else(|| ContractError::MissingMarshaller(desc.name()))
        };
        Ok(Self {
            request_marshaller: resolve(request_type)?,
            response_marshaller: resolve(response_type)?,
            reference,
        })
    }

    pub fn full_name(&self) -> String {
        self.reference.full_name()
    }

    pub fn method_id(&self) -> u64 {
        self.reference.method_id()
    }
}
