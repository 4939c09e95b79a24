use crate::RpcError;
use futures::{future::BoxFuture, stream::BoxStream};
use std::any::Any;

/// A payload, wrapper, or context value with its static type erased.
pub type AnyValue = Box<dyn Any + Send>;

/// Deferred result of an erased call.
pub type ErasedFuture = BoxFuture<'static, Result<AnyValue, RpcError>>;

/// Item stream of an erased streaming call.
pub type ErasedStream = BoxStream<'static, Result<AnyValue, RpcError>>;

/// Recovers the concrete type of an erased value.
pub fn downcast<T: 'static>(value: AnyValue) -> Result<T, RpcError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| RpcError::type_mismatch::<T>())
}

#[inline]
pub fn erase<T: Send + 'static>(value: T) -> AnyValue {
    Box::new(value)
}

/// Positional arguments of a call, in declaration order.
#[derive(Default)]
pub struct Args {
    values: std::collections::VecDeque<AnyValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: AnyValue) {
        self.values.push_back(value);
    }

    /// Takes the next argument, recovering its concrete type.
    pub fn take<T: 'static>(&mut self) -> Result<T, RpcError> {
        downcast(self.take_any()?)
    }

    pub fn take_any(&mut self) -> Result<AnyValue, RpcError> {
        self.values
            .pop_front()
            .ok_or_else(|| RpcError::invalid_operation("missing call argument"))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<AnyValue>> for Args {
    fn from(values: Vec<AnyValue>) -> Self {
        Self {
            values: values.into(),
        }
    }
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args").field("len", &self.values.len()).finish()
    }
}
