use super::Task;
use crate::RpcError;
use futures::FutureExt;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

enum State<T> {
    Ready(Option<Result<T, RpcError>>),
    Pending(Task<T>),
}

/// A call result that avoids allocating when it is already available.
///
/// Completed outcomes are stored inline and returned on the first poll;
/// everything else is backed by a [`Task`].
pub struct ValueTask<T> {
    state: State<T>,
}

// The stored value is moved out on completion and never pinned.
impl<T> Unpin for ValueTask<T> {}

impl<T: Send + 'static> ValueTask<T> {
    pub fn from_value(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    pub fn from_error(error: RpcError) -> Self {
        Self::from_result(Err(error))
    }

    pub fn from_result(result: Result<T, RpcError>) -> Self {
        Self {
            state: State::Ready(Some(result)),
        }
    }

    pub fn from_task(task: Task<T>) -> Self {
        Self {
            state: State::Pending(task),
        }
    }

    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, RpcError>> + Send + 'static,
    {
        Self::from_task(Task::new(future))
    }

    /// Whether the result can be taken without waiting.
    pub fn is_completed(&self) -> bool {
        matches!(self.state, State::Ready(Some(_)))
    }

    pub fn into_task(self) -> Task<T> {
        match self.state {
            State::Ready(Some(result)) => Task::from_result(result),
            State::Ready(None) => Task::from_error(polled_after_completion()),
            State::Pending(task) => task,
        }
    }
}

impl<T> Future for ValueTask<T> {
    type Output = Result<T, RpcError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Ready(slot) => {
                Poll::Ready(slot.take().unwrap_or_else(|| Err(polled_after_completion())))
            }
            State::Pending(task) => task.poll_unpin(cx),
        }
    }
}

impl<T: Send + 'static> From<Task<T>> for ValueTask<T> {
    fn from(task: Task<T>) -> Self {
        ValueTask::from_task(task)
    }
}

impl<T> fmt::Debug for ValueTask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let completed = matches!(self.state, State::Ready(Some(_)));
        f.debug_struct("ValueTask")
            .field("completed", &completed)
            .finish()
    }
}

fn polled_after_completion() -> RpcError {
    RpcError::invalid_operation("ValueTask polled after completion")
}
