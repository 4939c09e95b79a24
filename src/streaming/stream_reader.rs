use crate::RpcError;
use futures::{
    Stream, StreamExt,
    stream::{self, BoxStream},
};
use std::{
    fmt,
    pin::Pin,
    task::{Context, Poll},
};

/// The request side of a client-streaming or duplex call.
pub struct StreamReader<T> {
    inner: BoxStream<'static, Result<T, RpcError>>,
}

impl<T: Send + 'static> StreamReader<T> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, RpcError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    /// A reader over items that are all known up front.
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(items.into_iter().map(Ok)))
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    pub fn into_inner(self) -> BoxStream<'static, Result<T, RpcError>> {
        self.inner
    }
}

impl<T> Stream for StreamReader<T> {
    type Item = Result<T, RpcError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> fmt::Debug for StreamReader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader").finish_non_exhaustive()
    }
}
