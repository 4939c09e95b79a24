use crate::RpcError;
use futures::{FutureExt, future::BoxFuture};
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

/// A deferred call result.
///
/// Contract methods return `Task<T>` to be completed asynchronously. A task is
/// an ordinary future resolving to `Result<T, RpcError>`.
pub struct Task<T> {
    inner: BoxFuture<'static, Result<T, RpcError>>,
}

impl<T: Send + 'static> Task<T> {
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, RpcError>> + Send + 'static,
    {
        Self {
            inner: future.boxed(),
        }
    }

    /// A task that is already complete with `value`.
    pub fn from_value(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    pub fn from_error(error: RpcError) -> Self {
        Self::from_result(Err(error))
    }

    pub fn from_result(result: Result<T, RpcError>) -> Self {
        Self::new(futures::future::ready(result))
    }
}

impl<T> Future for Task<T> {
    type Output = Result<T, RpcError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}
