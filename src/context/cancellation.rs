use super::StatusCode;
use crate::RpcError;
use futures::future::{self, Either};
use std::{future::Future, pin::pin};
use tokio_util::sync::CancellationToken;

/// Resolves `work`, or fails with [`RpcError::Cancelled`] as soon as `token`
/// fires.
///
/// A `Cancelled` status coming out of `work` is reported the same way.
pub async fn with_cancellation<T, F>(token: CancellationToken, work: F) -> Result<T, RpcError>
where
    F: Future<Output = Result<T, RpcError>>,
{
    if token.is_cancelled() {
        return Err(RpcError::Cancelled);
    }

    let work = pin!(work);
    let cancelled = pin!(token.cancelled());
    match future::select(work, cancelled).await {
        Either::Left((result, _)) => result.map_err(normalize_cancellation),
        Either::Right(((), _)) => Err(RpcError::Cancelled),
    }
}

pub fn normalize_cancellation(error: RpcError) -> RpcError {
    match error {
        RpcError::Status(status) if status.code() == StatusCode::Cancelled => RpcError::Cancelled,
        other => other,
    }
}
