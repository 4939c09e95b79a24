use futures::{FutureExt, StreamExt, future::BoxFuture, stream};
use protocall::{
    AnyValue, AsyncStreamingCall, AsyncUnaryCall, CallCompletion, CallOutcome, CancellationToken,
    ErasedStream, Metadata, MetadataCapture, ResponseShape, RpcError, normalize_cancellation,
    with_cancellation,
};
use std::sync::Arc;

async fn complete_unary(
    call: AsyncUnaryCall,
    capture: Option<Arc<MetadataCapture>>,
) -> Result<AnyValue, RpcError> {
    let AsyncUnaryCall {
        response,
        headers,
        completion,
    } = call;

    // Headers are stored before the response is observed.
    if let Some(capture) = &capture {
        capture.set_headers(headers.await?);
    }

    let result = response.await;

    if let Some(capture) = &capture {
        let CallCompletion { status, trailers } = completion.await;
        capture.set_completion(status, trailers);
    }

    result
}

/// Adapts a single-response call to the method's declared response shape.
pub fn unary(
    call: AsyncUnaryCall,
    shape: ResponseShape,
    capture: Option<Arc<MetadataCapture>>,
    token: CancellationToken,
) -> CallOutcome {
    let pending = with_cancellation(token, complete_unary(call, capture)).boxed();
    match shape {
        ResponseShape::Sync => CallOutcome::Completed(futures::executor::block_on(pending)),
        ResponseShape::Deferred | ResponseShape::LightDeferred => CallOutcome::Pending(pending),
        ResponseShape::Streamed => CallOutcome::failed(RpcError::invalid_operation(
            "a single-response call cannot produce a response stream",
        )),
    }
}

struct StreamState {
    headers: Option<BoxFuture<'static, Result<Metadata, RpcError>>>,
    responses: ErasedStream,
    completion: Option<BoxFuture<'static, CallCompletion>>,
    capture: Option<Arc<MetadataCapture>>,
    token: CancellationToken,
    finished: bool,
}

impl StreamState {
    async fn capture_headers(&mut self) -> Result<(), RpcError> {
        let (Some(capture), Some(headers)) = (&self.capture, self.headers.take()) else {
            return Ok(());
        };
        let headers = with_cancellation(self.token.clone(), headers).await?;
        capture.set_headers(headers);
        Ok(())
    }

    async fn capture_completion(&mut self) {
        let (Some(capture), Some(completion)) = (&self.capture, self.completion.take()) else {
            return;
        };
        let completion = with_cancellation(self.token.clone(), completion.map(Ok)).await;
        if let Ok(CallCompletion { status, trailers }) = completion {
            capture.set_completion(status, trailers);
        }
    }
}

/// Adapts a streaming call into a response stream that waits once per item.
///
/// The first error ends the stream; trailers are captured when the transport
/// reports the end of the responses.
pub fn streaming(
    call: AsyncStreamingCall,
    capture: Option<Arc<MetadataCapture>>,
    token: CancellationToken,
) -> CallOutcome {
    let AsyncStreamingCall {
        responses,
        headers,
        completion,
    } = call;

    let state = StreamState {
        headers: Some(headers),
        responses,
        completion: Some(completion),
        capture,
        token,
        finished: false,
    };

    let responses = stream::unfold(state, |mut state| async move {
        if state.finished {
            return None;
        }

        if let Err(error) = state.capture_headers().await {
            state.finished = true;
            return Some((Err(error), state));
        }

        let token = state.token.clone();
        let next = with_cancellation(token, state.responses.next().map(Ok)).await;
        match next {
            Ok(Some(Ok(item))) => Some((Ok(item), state)),
            Ok(Some(Err(error))) | Err(error) => {
                state.finished = true;
                Some((Err(normalize_cancellation(error)), state))
            }
            Ok(None) => {
                state.capture_completion().await;
                None
            }
        }
    });

    CallOutcome::Streaming(responses.boxed())
}
