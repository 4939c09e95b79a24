use chrono::{TimeZone, Utc};
use protocall::{
    CallContext, CallContextFlags, CallOptions, CancellationToken, Metadata, RpcError,
    ServerCallContext, Status, StatusCode, normalize_cancellation, with_cancellation,
};
use std::{sync::Arc, time::Duration};

#[test]
fn test_default_context_is_a_plain_client() {
    let context = CallContext::default();
    assert!(!context.is_server());
    assert!(context.server_context().is_none());
    assert!(context.request_headers().is_empty());
    assert!(context.prepare().is_none());
}

#[test]
fn test_metadata_requires_capture_flag() {
    let context = CallContext::client(CallOptions::new());

    let error = context.response_headers().unwrap_err();
    assert!(error.to_string().contains("CaptureMetadata"));
    assert!(context.response_trailers().is_err());
    assert!(context.response_status().is_err());
}

#[test]
fn test_server_context_has_no_response_metadata() {
    let context = CallContext::server(ServerCallContext::new("/Greet.Greeter/SayHello"));
    assert!(context.is_server());
    assert!(matches!(
        context.response_headers(),
        Err(RpcError::InvalidOperation(message)) if message.contains("server")
    ));
}

#[test]
fn test_captured_metadata_lifecycle() {
    let context = CallContext::with_flags(CallOptions::new(), CallContextFlags::CaptureMetadata);

    // Nothing is available before a call starts.
    assert!(context.response_headers().is_err());

    let capture = context.prepare().unwrap();
    capture.set_headers(Metadata::new().with("x-served-by", "node-1"));
    assert_eq!(
        context.response_headers().unwrap().get("X-Served-By"),
        Some("node-1")
    );
    assert!(context.response_trailers().is_err());

    capture.set_completion(Status::ok(), Metadata::new().with("x-elapsed", "3ms"));
    assert_eq!(context.response_trailers().unwrap().get("x-elapsed"), Some("3ms"));
    assert!(context.response_status().unwrap().is_ok());

    // Preparing the next call clears the previous one's values.
    let again = context.prepare().unwrap();
    assert!(Arc::ptr_eq(&capture, &again));
    assert!(context.response_headers().is_err());
    assert!(context.response_status().is_err());
}

#[test]
fn test_clones_share_the_capture() {
    let context = CallContext::with_flags(CallOptions::new(), CallContextFlags::CaptureMetadata);
    let clone = context.clone();

    clone
        .prepare()
        .unwrap()
        .set_headers(Metadata::new().with("k", "v"));
    assert_eq!(context.response_headers().unwrap().get("k"), Some("v"));
}

#[test]
fn test_server_context_propagates_deadline_and_cancellation() {
    let deadline = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
    let token = CancellationToken::new();
    let server = ServerCallContext::new("/Svc/Op")
        .with_request_headers(Metadata::new().with("authorization", "secret"))
        .with_deadline(deadline)
        .with_cancellation_token(token.clone());

    let context = CallContext::from(server);
    assert_eq!(context.request_headers().get("authorization"), Some("secret"));

    let outgoing = context.client_options();
    assert_eq!(outgoing.deadline, Some(deadline));
    assert!(outgoing.headers.is_empty());

    token.cancel();
    assert!(outgoing.cancellation_token.is_cancelled());
}

#[test]
fn test_client_options_pass_through() {
    let options = CallOptions::new().with_headers(Metadata::new().with("x-trace", "abc"));
    let context = CallContext::from(options);
    assert_eq!(context.client_options().headers.get("x-trace"), Some("abc"));
}

#[test]
fn test_metadata_keys_and_binary_values() {
    let mut metadata = Metadata::new();
    metadata
        .add("X-Request-Id", "1")
        .add("x-request-id", "2")
        .add_bytes("payload", vec![1u8, 2, 3]);

    assert_eq!(metadata.len(), 3);
    assert_eq!(metadata.get("x-request-id"), Some("1"));
    assert_eq!(metadata.get_bytes("payload-bin"), Some(&[1u8, 2, 3][..]));
    assert_eq!(metadata.get("payload-bin"), None);
}

#[tokio::test]
async fn test_with_cancellation_completes_normally() {
    let result = with_cancellation(CancellationToken::new(), async { Ok::<_, RpcError>(5) }).await;
    assert_eq!(result, Ok(5));
}

#[tokio::test]
async fn test_with_cancellation_checks_token_first() {
    let token = CancellationToken::new();
    token.cancel();

    let result = with_cancellation(token, async { Ok::<_, RpcError>(5) }).await;
    assert_eq!(result, Err(RpcError::Cancelled));
}

#[tokio::test]
async fn test_with_cancellation_interrupts_pending_work() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        canceller.cancel();
    });

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        with_cancellation(token, futures::future::pending::<Result<(), RpcError>>()),
    )
    .await
    .expect("cancellation did not interrupt the call");
    assert_eq!(result, Err(RpcError::Cancelled));
}

#[test]
fn test_cancelled_status_is_normalized() {
    let cancelled = RpcError::Status(Status::cancelled("peer went away"));
    assert_eq!(normalize_cancellation(cancelled), RpcError::Cancelled);

    let other = RpcError::Status(Status::new(StatusCode::Unavailable, "down"));
    assert_eq!(normalize_cancellation(other.clone()), other);

    assert_eq!(RpcError::from(Status::cancelled("")), RpcError::Cancelled);
}

#[test]
fn test_status_codes_follow_the_wire_numbering() {
    assert_eq!(u8::from(StatusCode::Unimplemented), 12);
    assert_eq!(StatusCode::try_from(16u8), Ok(StatusCode::Unauthenticated));
    assert!(StatusCode::try_from(17u8).is_err());

    let status = Status::from_code(14, "down");
    assert_eq!(status.code(), StatusCode::Unavailable);
    assert_eq!(status.raw_code(), 14);

    // Codes from a newer peer degrade to Unknown.
    let unknown = Status::from_code(200, "what");
    assert_eq!(unknown.code(), StatusCode::Unknown);
    assert_eq!(unknown.detail(), "what");
}
