use crate::context::{Status, StatusCode};
use thiserror::Error;

/// Errors surfaced while a call is in flight.
///
/// Transport failures travel through unchanged as [`RpcError::Status`], except
/// for cancellation, which always normalizes to [`RpcError::Cancelled`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RpcError {
    /// The call's cancellation token fired, or the transport reported `Cancelled`.
    #[error("the call was cancelled")]
    Cancelled,

    /// The transport completed the call with a non-OK status.
    #[error("call failed with status {0}")]
    Status(Status),

    /// The invoked method has no usable client binding.
    #[error("operation is not supported by this client: {0}")]
    Unsupported(String),

    /// A payload could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(String),

    /// The operation is not valid for the current state of the object.
    #[error("{0}")]
    InvalidOperation(String),

    /// An erased value did not have the type the receiving side expected.
    #[error("type mismatch: expected `{expected}`")]
    TypeMismatch { expected: &'static str },
}

impl RpcError {
    pub fn unsupported(message: impl Into<String>) -> Self {
        RpcError::Unsupported(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        RpcError::InvalidOperation(message.into())
    }

    pub fn type_mismatch<T: ?Sized>() -> Self {
        RpcError::TypeMismatch {
            expected: std::any::type_name::<T>(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RpcError::Cancelled)
    }
}

impl From<Status> for RpcError {
    fn from(status: Status) -> Self {
        if status.code() == StatusCode::Cancelled {
            RpcError::Cancelled
        } else {
            RpcError::Status(status)
        }
    }
}

/// Configuration errors raised while inspecting or binding a contract.
///
/// These are reported synchronously from the build call that hit them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Client proxies can only be generated for interface contracts.
    #[error("`{0}` is not an interface contract")]
    NotAnInterface(&'static str),

    /// Neither an annotation nor the type name yields a service name.
    #[error("unable to resolve a service name for `{0}`")]
    MissingServiceName(&'static str),

    /// Two methods resolve to the same operation name within one service.
    #[error(
        "duplicate operation `{operation}` in service `{service}`: declared by `{first}` and `{second}`"
    )]
    DuplicateOperation {
        service: String,
        operation: String,
        first: &'static str,
        second: &'static str,
    },

    /// A request or response type has no registered marshaller.
    #[error("no marshaller is available for `{0}`")]
    MissingMarshaller(String),

    /// The method classified, but this side cannot express its shape.
    #[error("method `{method}` cannot be bound: {reason}")]
    UnsupportedShape {
        method: &'static str,
        reason: &'static str,
    },
}
