use crate::{
    RpcService,
    thunk::{ServerHandler, server_handler},
};
use protocall::{
    Annotations, ContractError, ContractImplementation, ContractOperation, EndpointMetadata,
    MarshallerCache, RpcMethod, ServiceMethodRegistrar, TypeCache, inspect,
};
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt,
    sync::Arc,
};

/// One method ready to be registered with the hosting runtime.
pub struct BoundServiceMethod<S> {
    pub method: RpcMethod,
    pub metadata: EndpointMetadata,
    pub handler: ServerHandler<S>,
}

impl<S> Clone for BoundServiceMethod<S> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            metadata: self.metadata.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<S> fmt::Debug for BoundServiceMethod<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundServiceMethod")
            .field("method", &self.method.reference)
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Every method bound for service type `S`.
pub struct ServiceBinding<S> {
    service_type: &'static str,
    methods: Vec<BoundServiceMethod<S>>,
}

impl<S> ServiceBinding<S> {
    pub fn service_type(&self) -> &'static str {
        self.service_type
    }

    pub fn methods(&self) -> &[BoundServiceMethod<S>] {
        &self.methods
    }

    /// The method registered under `/{service}/{operation}`.
    pub fn method(&self, full_name: &str) -> Option<&BoundServiceMethod<S>> {
        self.methods.iter().find(|m| m.method.full_name() == full_name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registers each method on the entry point for its call kind; returns
    /// how many were registered.
    pub fn register(&self, registrar: &mut dyn ServiceMethodRegistrar<S>) -> usize {
        for bound in &self.methods {
            let method = bound.method.clone();
            let metadata = bound.metadata.clone();
            match &bound.handler {
                ServerHandler::Unary(handler) => {
                    registrar.add_unary_method(method, metadata, handler.clone())
                }
                ServerHandler::ClientStreaming(handler) => {
                    registrar.add_client_streaming_method(method, metadata, handler.clone())
                }
                ServerHandler::ServerStreaming(handler) => {
                    registrar.add_server_streaming_method(method, metadata, handler.clone())
                }
                ServerHandler::DuplexStreaming(handler) => {
                    registrar.add_duplex_streaming_method(method, metadata, handler.clone())
                }
            }
        }
        self.methods.len()
    }
}

impl<S> fmt::Debug for ServiceBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service_type", &self.service_type)
            .field("methods", &self.methods)
            .finish()
    }
}

/// Builds and caches one [`ServiceBinding`] per service type.
#[derive(Debug, Default)]
pub struct ServiceBinder {
    bindings: TypeCache,
    marshallers: Arc<MarshallerCache>,
}

impl ServiceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marshallers(marshallers: Arc<MarshallerCache>) -> Self {
        Self {
            bindings: TypeCache::new(),
            marshallers,
        }
    }

    /// The binding for `S`, built on first use.
    ///
    /// Methods that fail to bind are logged and left out. Only a duplicate
    /// operation name fails the whole service.
    pub fn bind<S: RpcService>(&self) -> Result<Arc<ServiceBinding<S>>, ContractError> {
        self.bindings
            .get_or_try_insert_with::<S, ServiceBinding<S>, _, _>(|| self.build::<S>())
    }

    /// How many binding builds have run.
    pub fn build_count(&self) -> usize {
        self.bindings.build_count()
    }

    pub fn marshallers(&self) -> &Arc<MarshallerCache> {
        &self.marshallers
    }

    fn build<S: RpcService>(&self) -> Result<ServiceBinding<S>, ContractError> {
        let class = S::class_contract();
        let class_info = &class.definition().info;
        let service_type = class_info.type_name;

        if class_info.annotations.is_bind_service_method() {
            tracing::debug!(
                "Skipping {}: it is the runtime's default method handler",
                service_type
            );
            return Ok(ServiceBinding {
                service_type,
                methods: Vec::new(),
            });
        }

        let type_annotations = class_info.annotations.clone();
        let mut sources = vec![class];
        for contract in S::implemented_contracts() {
            let info = &contract.definition().info;
            if info.is_interface() && !info.annotations.is_service_contract() {
                tracing::debug!(
                    "Ignoring {} on {}: not tagged as a service contract",
                    info.type_name,
                    service_type
                );
                continue;
            }
            sources.push(contract);
        }

        let mut methods = Vec::new();
        let mut declared_by: HashMap<(String, String), &'static str> = HashMap::new();

        for source in &sources {
            let descriptor = match inspect(source.definition()) {
                Ok(descriptor) => descriptor,
                Err(ContractError::MissingServiceName(contract)) => {
                    tracing::warn!(
                        "Skipping {} on {}: no service name could be resolved",
                        contract,
                        service_type
                    );
                    continue;
                }
                Err(error) => return Err(error),
            };
            let service_name = descriptor.service_name();

            for operation in descriptor.operations() {
                let key = (service_name.to_string(), operation.name().to_string());
                match declared_by.entry(key) {
                    Entry::Occupied(entry) => {
                        return Err(ContractError::DuplicateOperation {
                            service: service_name.to_string(),
                            operation: operation.name().to_string(),
                            first: *entry.get(),
                            second: operation.source_method().name,
                        });
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(operation.source_method().name);
                    }
                }

                match self.bind_operation(source, service_name, operation, &type_annotations) {
                    Ok(bound) => {
                        tracing::info!(
                            "Bound {} to {}::{}",
                            bound.method.reference,
                            service_type,
                            operation.source_method().name
                        );
                        methods.push(bound);
                    }
                    Err(error) => {
                        tracing::error!(
                            "Unable to bind {}::{}: {}",
                            service_type,
                            operation.source_method().name,
                            error
                        );
                    }
                }
            }
        }

        Ok(ServiceBinding {
            service_type,
            methods,
        })
    }

    fn bind_operation<S: RpcService>(
        &self,
        source: &ContractImplementation<S>,
        service_name: &str,
        operation: &ContractOperation,
        type_annotations: &Annotations,
    ) -> Result<BoundServiceMethod<S>, ContractError> {
        let source_method = operation.source_method();
        let invoker = source
            .invoker(source_method.name)
            .ok_or(ContractError::UnsupportedShape {
                method: source_method.name,
                reason: "no implementation is attached to the method",
            })?;

        let method = RpcMethod::resolve(
            operation.method_reference(service_name),
            operation.request_type(),
            operation.response_type(),
            &self.marshallers,
        )?;
        let handler = server_handler(operation, invoker)?;
        let metadata = EndpointMetadata::from_layers(type_annotations, &source_method.annotations);

        Ok(BoundServiceMethod {
            method,
            metadata,
            handler,
        })
    }
}
