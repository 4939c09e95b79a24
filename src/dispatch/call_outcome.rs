use crate::{
    AnyValue, ErasedFuture, ErasedStream, ResponseStream, RpcError, Task, ValueTask, downcast,
};
use futures::{FutureExt, TryStreamExt, future};
use std::fmt;

/// What a client thunk hands back before it is reshaped into the method's
/// declared return type.
pub enum CallOutcome {
    /// The call has already finished.
    Completed(Result<AnyValue, RpcError>),
    /// The call will finish later.
    Pending(ErasedFuture),
    /// The call yields a stream of responses.
    Streaming(ErasedStream),
}

impl CallOutcome {
    pub fn failed(error: RpcError) -> Self {
        CallOutcome::Completed(Err(error))
    }
}

impl fmt::Debug for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallOutcome::Completed(Ok(_)) => f.write_str("Completed(Ok(..))"),
            CallOutcome::Completed(Err(e)) => write!(f, "Completed(Err({:?}))", e),
            CallOutcome::Pending(_) => f.write_str("Pending(..)"),
            CallOutcome::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

/// Return types a generated client method may declare.
pub trait ClientReturn: Sized {
    fn from_outcome(outcome: CallOutcome) -> Self;
}

fn streaming_mismatch() -> RpcError {
    RpcError::invalid_operation("a streaming call cannot produce a single response")
}

/// Blocks the calling thread until a pending outcome finishes.
impl<T: Send + 'static> ClientReturn for Result<T, RpcError> {
    fn from_outcome(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Completed(result) => result.and_then(downcast::<T>),
            CallOutcome::Pending(pending) => {
                futures::executor::block_on(pending).and_then(downcast::<T>)
            }
            CallOutcome::Streaming(_) => Err(streaming_mismatch()),
        }
    }
}

impl<T: Send + 'static> ClientReturn for Task<T> {
    fn from_outcome(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Completed(result) => Task::from_result(result.and_then(downcast::<T>)),
            CallOutcome::Pending(pending) => {
                Task::new(pending.map(|result| result.and_then(downcast::<T>)))
            }
            CallOutcome::Streaming(_) => Task::from_error(streaming_mismatch()),
        }
    }
}

impl<T: Send + 'static> ClientReturn for ValueTask<T> {
    fn from_outcome(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Completed(result) => {
                ValueTask::from_result(result.and_then(downcast::<T>))
            }
            CallOutcome::Pending(pending) => {
                ValueTask::new(pending.map(|result| result.and_then(downcast::<T>)))
            }
            CallOutcome::Streaming(_) => ValueTask::from_error(streaming_mismatch()),
        }
    }
}

impl<T: Send + 'static> ClientReturn for ResponseStream<T> {
    fn from_outcome(outcome: CallOutcome) -> Self {
        match outcome {
            CallOutcome::Streaming(stream) => ResponseStream::new(
                stream.and_then(|item| future::ready(downcast::<T>(item))),
            ),
            CallOutcome::Completed(Err(error)) => ResponseStream::from_error(error),
            CallOutcome::Completed(Ok(_)) | CallOutcome::Pending(_) => {
                ResponseStream::from_error(RpcError::invalid_operation(
                    "a single-response call cannot produce a response stream",
                ))
            }
        }
    }
}
