use example_protocall_service_definition::{HelloReply, HelloRequest, Ping, Pong};
use protocall::{
    CallKind, Marshaller, MarshallerCache, MethodReference, RpcError, Task, TypeDesc, downcast,
    erase, rpc_method_id,
};
use rand::seq::SliceRandom;

#[test]
fn test_prost_marshaller_encodes_messages() {
    let marshaller = Marshaller::prost::<Ping>();
    let ping = Ping::new(42, "hello");

    let bytes = marshaller.serialize(&*erase(ping.clone())).unwrap();
    assert_eq!(bytes, prost::Message::encode_to_vec(&ping));

    let decoded = downcast::<Ping>(marshaller.deserialize(&bytes).unwrap()).unwrap();
    assert_eq!(decoded, ping);
}

#[test]
fn test_marshaller_rejects_other_types() {
    let marshaller = Marshaller::prost::<Ping>();
    let result = marshaller.serialize(&*erase(HelloRequest::new("x")));
    assert!(matches!(result, Err(RpcError::TypeMismatch { expected }) if expected.ends_with("Ping")));
}

#[test]
fn test_marshaller_reports_malformed_input() {
    let marshaller = Marshaller::prost::<Ping>();
    // A length-delimited field whose length runs past the end of the buffer.
    let result = marshaller.deserialize(&[0x12, 0x05, b'a']);
    assert!(matches!(result, Err(RpcError::Codec(_))));
}

#[test]
fn test_cache_resolves_each_type_once() {
    let cache = MarshallerCache::new();

    let first = cache.resolve(&TypeDesc::of::<Ping>()).unwrap();
    let second = cache.resolve(&TypeDesc::of::<Ping>()).unwrap();
    assert_eq!(first.type_name(), second.type_name());
    assert_eq!(cache.len(), 1);

    cache.resolve(&TypeDesc::of::<HelloRequest>()).unwrap();
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_cache_is_independent_of_resolution_order() {
    let mut descs = vec![
        TypeDesc::of::<HelloRequest>(),
        TypeDesc::of::<HelloReply>(),
        TypeDesc::of::<Ping>(),
        TypeDesc::of::<Pong>(),
        TypeDesc::of::<String>(),
    ];
    descs.extend(descs.clone());
    descs.shuffle(&mut rand::rng());

    let cache = MarshallerCache::new();
    for desc in &descs {
        let resolved = cache.resolve(desc);
        assert_eq!(resolved.is_some(), !desc.is::<String>(), "{:?}", desc);
        if let Some(marshaller) = resolved {
            assert_eq!(marshaller.type_name(), desc.name());
        }
    }
    assert_eq!(cache.len(), 4);
}

#[test]
fn test_cache_skips_non_message_types() {
    let cache = MarshallerCache::new();
    assert!(cache.resolve(&TypeDesc::of::<i32>()).is_none());
    assert!(cache.resolve(&TypeDesc::of::<Task<Ping>>()).is_none());
    assert!(cache.is_empty());
}

#[test]
fn test_method_id_matches_compile_time_macro() {
    let reference = MethodReference::new("Greet.Greeter", "SayHello", CallKind::Unary, "say_hello");
    assert_eq!(reference.full_name(), "/Greet.Greeter/SayHello");
    assert_eq!(reference.method_id(), rpc_method_id!("/Greet.Greeter/SayHello"));
    assert_ne!(reference.method_id(), rpc_method_id!("/Greet.Greeter/SayHellos"));
    assert_eq!(reference.to_string(), "/Greet.Greeter/SayHello (Unary)");
}
