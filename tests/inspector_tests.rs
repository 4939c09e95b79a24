use example_protocall_service_definition::{AllShapes, Greeter, Ping, Pong};
use protocall::{
    Annotation, CallKind, Contract, ContractDefinition, ContractError, ContractInfo,
    ContractKind, MethodSignature, Task, TypeDesc, ValueTask, inspect, operation_name,
    resolve_service_name,
};

fn unary(name: &'static str) -> MethodSignature {
    MethodSignature::new(name, vec![TypeDesc::of::<Ping>()], TypeDesc::of::<Task<Pong>>())
}

#[test]
fn test_operation_names() {
    assert_eq!(operation_name(&unary("say_hello")), "SayHello");
    assert_eq!(operation_name(&unary("say_hello_async")), "SayHello");
    assert_eq!(operation_name(&unary("get")), "Get");

    // Nothing left after stripping keeps the suffix.
    assert_eq!(operation_name(&unary("async")), "Async");

    let renamed = unary("say_hello").with_annotation(Annotation::operation_contract("Greet"));
    assert_eq!(operation_name(&renamed), "Greet");

    let blank = unary("say_hello").with_annotation(Annotation::operation_contract("  "));
    assert_eq!(operation_name(&blank), "SayHello");
}

#[test]
fn test_service_names() {
    let named = ContractInfo::interface("my_app::contracts::Calculator", Some("Math.Calc"));
    assert_eq!(resolve_service_name(&named).as_deref(), Some("Math.Calc"));

    let unnamed = ContractInfo::interface("my_app::contracts::Calculator", None);
    assert_eq!(
        resolve_service_name(&unnamed).as_deref(),
        Some("my_app.contracts.Calculator")
    );

    let blank = ContractInfo::interface("dyn my_app::Calculator", Some(" "));
    assert_eq!(resolve_service_name(&blank).as_deref(), Some("my_app.Calculator"));

    let anonymous = ContractInfo::class("");
    assert_eq!(resolve_service_name(&anonymous), None);
}

#[test]
fn test_missing_service_name_is_reported() {
    let definition = ContractDefinition::new(ContractInfo::class(""));
    assert_eq!(
        inspect(&definition).unwrap_err(),
        ContractError::MissingServiceName("")
    );
}

#[test]
fn test_greeter_contract() {
    let descriptor = inspect(&<dyn Greeter>::contract()).unwrap();

    assert_eq!(descriptor.service_name(), "Greet.Greeter");
    assert!(descriptor.contract_type().ends_with("Greeter"));

    let names: Vec<&str> = descriptor.operations().iter().map(|op| op.name()).collect();
    assert_eq!(names, vec!["SayHello", "SayHellos"]);

    let say_hellos = descriptor.operation("SayHellos").unwrap();
    assert_eq!(say_hellos.call_kind(), CallKind::ServerStreaming);
    assert_eq!(
        say_hellos.method_reference(descriptor.service_name()).full_name(),
        "/Greet.Greeter/SayHellos"
    );
    assert!(descriptor.unmatched_methods().is_empty());
}

#[test]
fn test_all_shapes_contract() {
    let descriptor = inspect(&<dyn AllShapes>::contract()).unwrap();

    // `is_valid` matches no call shape and is listed separately.
    assert_eq!(descriptor.operations().len(), 10);
    assert_eq!(descriptor.unmatched_methods(), &["is_valid"]);

    let expected = [
        ("BlockingUnary", CallKind::Unary),
        ("TaskUnary", CallKind::Unary),
        ("ValueTaskUnary", CallKind::Unary),
        ("ClientStreaming", CallKind::ClientStreaming),
        ("ServerStreaming", CallKind::ServerStreaming),
        ("Duplex", CallKind::DuplexStreaming),
        ("Relabel", CallKind::Unary),
        ("ServerStreamingWriter", CallKind::ServerStreaming),
        ("DuplexWriter", CallKind::DuplexStreaming),
        ("EchoNumber", CallKind::Unary),
    ];
    for (name, kind) in expected {
        let operation = descriptor
            .operation(name)
            .unwrap_or_else(|| panic!("missing operation {}", name));
        assert_eq!(operation.call_kind(), kind, "{}", name);
    }

    assert_eq!(
        descriptor.operation("Relabel").unwrap().source_method().name,
        "renamed"
    );
}

#[test]
fn test_class_methods_require_opt_in() {
    let definition = ContractDefinition::new(ContractInfo::class("app::Calculator"))
        .with_method(unary("add").with_annotation(Annotation::OperationContract { name: None }))
        .with_method(unary("helper"));

    let descriptor = inspect(&definition).unwrap();
    assert_eq!(descriptor.service_name(), "app.Calculator");
    assert_eq!(descriptor.operations().len(), 1);
    assert_eq!(descriptor.operations()[0].name(), "Add");

    // Skipped for lack of opt-in, not for shape.
    assert!(descriptor.unmatched_methods().is_empty());
}

#[test]
fn test_interface_methods_need_no_opt_in() {
    let definition = ContractDefinition::new(ContractInfo::new(
        ContractKind::Interface,
        "app::Calculator",
    ))
    .with_method(unary("add"))
    .with_method(unary("subtract"));

    assert_eq!(inspect(&definition).unwrap().operations().len(), 2);
}

#[test]
fn test_duplicate_operation_names_are_rejected() {
    let definition = ContractDefinition::new(ContractInfo::interface("app::Store", None))
        .with_method(unary("get"))
        .with_method(MethodSignature::new(
            "get_async",
            vec![TypeDesc::of::<Ping>()],
            TypeDesc::of::<ValueTask<Pong>>(),
        ));

    assert_eq!(
        inspect(&definition).unwrap_err(),
        ContractError::DuplicateOperation {
            service: "app.Store".to_string(),
            operation: "Get".to_string(),
            first: "get",
            second: "get_async",
        }
    );
}

#[test]
fn test_renaming_resolves_a_collision() {
    let definition = ContractDefinition::new(ContractInfo::interface("app::Store", None))
        .with_method(unary("get"))
        .with_method(unary("get_async").with_annotation(Annotation::operation_contract("GetLater")));

    let descriptor = inspect(&definition).unwrap();
    assert!(descriptor.operation("Get").is_some());
    assert!(descriptor.operation("GetLater").is_some());
}
