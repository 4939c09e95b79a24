use crate::{RpcError, constants::DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE};
use futures::{Sink, SinkExt, channel::mpsc};
use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

/// The response side of a server-streaming or duplex call.
pub struct StreamWriter<T> {
    inner: Pin<Box<dyn Sink<T, Error = RpcError> + Send>>,
}

impl<T: Send + 'static> StreamWriter<T> {
    pub fn new<S>(sink: S) -> Self
    where
        S: Sink<T, Error = RpcError> + Send + 'static,
    {
        Self {
            inner: Box::pin(sink),
        }
    }

    /// A writer feeding a bounded channel; the receiver observes every
    /// written item in order.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(buffer);
        let sink = tx.sink_map_err(|_| {
            RpcError::invalid_operation("the response stream has already been closed")
        });
        (Self::new(sink), rx)
    }

    pub fn default_channel() -> (Self, mpsc::Receiver<T>) {
        Self::channel(DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE)
    }

    /// Sends one item, waiting for capacity if the transport applies backpressure.
    pub async fn write(&mut self, item: T) -> Result<(), RpcError> {
        self.inner.send(item).await
    }

    pub async fn close(&mut self) -> Result<(), RpcError> {
        self.inner.close().await
    }
}

impl<T> Sink<T> for StreamWriter<T> {
    type Error = RpcError;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), RpcError>> {
        self.inner.as_mut().poll_ready(cx)
    }

    fn start_send(mut self: Pin<&mut Self>, item: T) -> Result<(), RpcError> {
        self.inner.as_mut().start_send(item)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), RpcError>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), RpcError>> {
        self.inner.as_mut().poll_close(cx)
    }
}

impl<T> fmt::Debug for StreamWriter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamWriter").finish_non_exhaustive()
    }
}
