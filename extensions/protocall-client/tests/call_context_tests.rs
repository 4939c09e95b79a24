use example_protocall_service_definition::{AllShapes, Ping, Pong};
use futures::{
    FutureExt, StreamExt,
    channel::{mpsc, oneshot},
    future, poll,
};
use protocall::{
    AnyValue, AsyncStreamingCall, AsyncUnaryCall, CallCompletion, CallContext, CallContextFlags,
    CallInvoker, CallOptions, CancellationToken, Metadata, RpcError, RpcMethod, Status,
    StatusCode, StreamReader, erase,
};
use protocall_client::ProxyRegistry;
use std::{
    sync::{Arc, Mutex},
    task::Poll,
    time::Duration,
};

// --- Test Setup: Mock Implementations ---

/// A transport whose responses are released by the test.
///
/// Headers resolve immediately; the unary response and the completion wait
/// for the test to send them.
#[derive(Default)]
struct ScriptedInvoker {
    unary_response: Mutex<Option<oneshot::Receiver<Result<AnyValue, RpcError>>>>,
    streaming_responses: Mutex<Option<mpsc::UnboundedReceiver<Result<AnyValue, RpcError>>>>,
    completion: Mutex<Option<oneshot::Receiver<CallCompletion>>>,
}

impl ScriptedInvoker {
    fn headers() -> Metadata {
        Metadata::new().with("x-served-by", "scripted")
    }

    fn completion(&self) -> futures::future::BoxFuture<'static, CallCompletion> {
        let receiver = self.completion.lock().unwrap().take().unwrap();
        receiver
            .map(|completion| completion.unwrap_or_default())
            .boxed()
    }
}

impl CallInvoker for ScriptedInvoker {
    fn async_unary_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _request: AnyValue,
    ) -> AsyncUnaryCall {
        let response = self.unary_response.lock().unwrap().take().unwrap();
        AsyncUnaryCall::new(
            response
                .map(|r| r.unwrap_or_else(|_| Err(RpcError::Cancelled)))
                .boxed(),
            future::ready(Ok(Self::headers())).boxed(),
            self.completion(),
        )
    }

    fn async_client_streaming_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _requests: StreamReader<AnyValue>,
    ) -> AsyncUnaryCall {
        AsyncUnaryCall::ready(Err(RpcError::unsupported("not scripted")))
    }

    fn async_server_streaming_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _request: AnyValue,
    ) -> AsyncStreamingCall {
        AsyncStreamingCall::from_stream(futures::stream::empty().boxed())
    }

    fn async_duplex_streaming_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _requests: StreamReader<AnyValue>,
    ) -> AsyncStreamingCall {
        let responses = self.streaming_responses.lock().unwrap().take().unwrap();
        AsyncStreamingCall::new(
            responses.boxed(),
            future::ready(Ok(Self::headers())).boxed(),
            self.completion(),
        )
    }
}

/// A transport that never answers.
struct SilentInvoker;

impl CallInvoker for SilentInvoker {
    fn async_unary_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _request: AnyValue,
    ) -> AsyncUnaryCall {
        AsyncUnaryCall::new(
            future::pending().boxed(),
            future::pending().boxed(),
            future::pending().boxed(),
        )
    }

    fn async_client_streaming_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        _requests: StreamReader<AnyValue>,
    ) -> AsyncUnaryCall {
        self.async_unary_call(method, host, options, erase(()))
    }

    fn async_server_streaming_call(
        &self,
        _method: &RpcMethod,
        _host: Option<&str>,
        _options: CallOptions,
        _request: AnyValue,
    ) -> AsyncStreamingCall {
        AsyncStreamingCall::from_stream(futures::stream::pending().boxed())
    }

    fn async_duplex_streaming_call(
        &self,
        method: &RpcMethod,
        host: Option<&str>,
        options: CallOptions,
        _requests: StreamReader<AnyValue>,
    ) -> AsyncStreamingCall {
        self.async_server_streaming_call(method, host, options, erase(()))
    }
}

fn trailers() -> Metadata {
    Metadata::new().with("x-elapsed-ms", "12")
}

// --- Tests ---

#[tokio::test]
async fn test_headers_are_captured_before_trailers() {
    let (response_tx, response_rx) = oneshot::channel();
    let (completion_tx, completion_rx) = oneshot::channel();
    let invoker = Arc::new(ScriptedInvoker {
        unary_response: Mutex::new(Some(response_rx)),
        completion: Mutex::new(Some(completion_rx)),
        ..Default::default()
    });
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(invoker)
        .unwrap();

    let context = CallContext::with_flags(CallOptions::new(), CallContextFlags::CaptureMetadata);
    let mut task = shapes.value_task_unary_async(Ping::new(1, "meta"), context.clone());

    // Nothing has been observed yet.
    assert!(context.response_headers().is_err());

    // The first poll reads the headers, then waits on the response.
    assert!(matches!(poll!(&mut task), Poll::Pending));
    assert_eq!(
        context.response_headers().unwrap().get("x-served-by"),
        Some("scripted")
    );
    let early = context.response_trailers().unwrap_err();
    assert_eq!(
        early,
        RpcError::invalid_operation("Trailers are not yet available")
    );
    assert!(context.response_status().is_err());

    response_tx
        .send(Ok(erase(Pong::from(Ping::new(1, "meta")))))
        .unwrap();
    completion_tx
        .send(CallCompletion::new(Status::ok(), trailers()))
        .unwrap();

    let pong = task.await.unwrap();
    assert_eq!(pong.label, "meta");
    assert_eq!(
        context.response_trailers().unwrap().get("x-elapsed-ms"),
        Some("12")
    );
    assert!(context.response_status().unwrap().is_ok());
}

#[tokio::test]
async fn test_streaming_trailers_arrive_after_last_item() {
    let (item_tx, item_rx) = mpsc::unbounded();
    let (completion_tx, completion_rx) = oneshot::channel();
    let invoker = Arc::new(ScriptedInvoker {
        streaming_responses: Mutex::new(Some(item_rx)),
        completion: Mutex::new(Some(completion_rx)),
        ..Default::default()
    });
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(invoker)
        .unwrap();

    let context = CallContext::with_flags(CallOptions::new(), CallContextFlags::CaptureMetadata);
    let mut responses = shapes.duplex(StreamReader::empty(), context.clone());

    item_tx
        .unbounded_send(Ok(erase(Pong::from(Ping::new(1, "first")))))
        .unwrap();
    let first = responses.next().await.unwrap().unwrap();
    assert_eq!(first.label, "first");
    assert!(context.response_headers().is_ok());
    assert!(context.response_trailers().is_err());

    drop(item_tx);
    completion_tx
        .send(CallCompletion::new(Status::ok(), trailers()))
        .unwrap();
    assert!(responses.next().await.is_none());
    assert_eq!(
        context.response_trailers().unwrap().get("x-elapsed-ms"),
        Some("12")
    );
}

#[tokio::test]
async fn test_context_without_capture_flag_reports_why() {
    let (response_tx, response_rx) = oneshot::channel();
    let (completion_tx, completion_rx) = oneshot::channel();
    let invoker = Arc::new(ScriptedInvoker {
        unary_response: Mutex::new(Some(response_rx)),
        completion: Mutex::new(Some(completion_rx)),
        ..Default::default()
    });
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(invoker)
        .unwrap();

    response_tx
        .send(Ok(erase(Pong::from(Ping::new(3, "plain")))))
        .unwrap();
    completion_tx.send(CallCompletion::default()).unwrap();

    let context = CallContext::default();
    shapes
        .value_task_unary_async(Ping::new(3, "plain"), context.clone())
        .await
        .unwrap();

    let error = context.response_headers().unwrap_err();
    assert!(error.to_string().contains("CaptureMetadata"));
}

#[tokio::test]
async fn test_cancellation_interrupts_a_pending_call() {
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(Arc::new(SilentInvoker))
        .unwrap();

    let token = CancellationToken::new();
    let options = CallOptions::new().with_cancellation_token(token.clone());
    let task = shapes.task_unary(Ping::new(1, "never"), options);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("cancellation should end the call");
    assert_eq!(result, Err(RpcError::Cancelled));
}

#[tokio::test]
async fn test_cancellation_ends_a_response_stream() {
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(Arc::new(SilentInvoker))
        .unwrap();

    let token = CancellationToken::new();
    let context = CallContext::client(CallOptions::new().with_cancellation_token(token.clone()));
    let mut responses = shapes.duplex(StreamReader::empty(), context);

    token.cancel();

    let first = responses.next().await.unwrap();
    assert_eq!(first, Err(RpcError::Cancelled));
    assert!(responses.next().await.is_none());
}

#[tokio::test]
async fn test_transport_cancelled_status_is_normalized() {
    let (response_tx, response_rx) = oneshot::channel();
    let (_completion_tx, completion_rx) = oneshot::channel();
    let invoker = Arc::new(ScriptedInvoker {
        unary_response: Mutex::new(Some(response_rx)),
        completion: Mutex::new(Some(completion_rx)),
        ..Default::default()
    });
    let shapes = ProxyRegistry::new()
        .create::<dyn AllShapes>(invoker)
        .unwrap();

    response_tx
        .send(Err(RpcError::Status(Status::new(
            StatusCode::Cancelled,
            "client went away",
        ))))
        .unwrap();

    let result = shapes.task_unary(Ping::new(1, "x"), CallOptions::new()).await;
    assert_eq!(result, Err(RpcError::Cancelled));
}
