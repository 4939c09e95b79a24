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

/// Responses of a server-streaming or duplex call, returned by value.
///
/// The returning form of a writer parameter: a server method may either push
/// items into a [`StreamWriter`](super::StreamWriter) or hand back a
/// `ResponseStream`, and a client proxy always yields one.
pub struct ResponseStream<T> {
    inner: BoxStream<'static, Result<T, RpcError>>,
}

impl<T: Send + 'static> ResponseStream<T> {
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<T, RpcError>> + Send + 'static,
    {
        Self {
            inner: stream.boxed(),
        }
    }

    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(items.into_iter().map(Ok)))
    }

    /// A stream that yields `error` once and ends.
    pub fn from_error(error: RpcError) -> Self {
        Self::new(stream::once(futures::future::ready(Err(error))))
    }

    pub fn into_inner(self) -> BoxStream<'static, Result<T, RpcError>> {
        self.inner
    }
}

impl<T> Stream for ResponseStream<T> {
    type Item = Result<T, RpcError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> fmt::Debug for ResponseStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream").finish_non_exhaustive()
    }
}
