use crate::{RpcService, ServiceBinder};
use protocall::{ContractError, ServiceMethodProvider, ServiceMethodRegistrar};
use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// Discovers the methods of every [`RpcService`] through a shared
/// [`ServiceBinder`].
#[derive(Debug, Default)]
pub struct CodeFirstServiceMethodProvider {
    binder: Arc<ServiceBinder>,
}

impl CodeFirstServiceMethodProvider {
    pub fn new(binder: Arc<ServiceBinder>) -> Self {
        Self { binder }
    }

    pub fn binder(&self) -> &Arc<ServiceBinder> {
        &self.binder
    }
}

impl<S: RpcService> ServiceMethodProvider<S> for CodeFirstServiceMethodProvider {
    fn on_service_method_discovery(
        &self,
        registrar: &mut dyn ServiceMethodRegistrar<S>,
    ) -> Result<usize, ContractError> {
        let binding = self.binder.bind::<S>()?;
        let registered = binding.register(registrar);
        tracing::debug!(
            "Registered {} code-first methods for {}",
            registered,
            binding.service_type()
        );
        Ok(registered)
    }
}

/// The host's service-composition surface, reduced to what code-first RPC
/// needs: singletons keyed by type.
pub trait ServiceCollection {
    fn contains(&self, type_id: TypeId) -> bool;

    fn get(&self, type_id: TypeId) -> Option<Arc<dyn Any + Send + Sync>>;

    fn add_singleton(&mut self, type_id: TypeId, instance: Arc<dyn Any + Send + Sync>);
}

/// Adds code-first RPC support to a host's service collection.
pub trait CodeFirstRpcExt: ServiceCollection {
    /// Registers a [`CodeFirstServiceMethodProvider`] with its own binder.
    ///
    /// Calling this more than once keeps the first provider.
    fn add_code_first_rpc(&mut self) -> &mut Self {
        self.add_code_first_rpc_with(Arc::new(ServiceBinder::new()))
    }

    /// Like [`add_code_first_rpc`](Self::add_code_first_rpc), binding through
    /// `binder`.
    fn add_code_first_rpc_with(&mut self, binder: Arc<ServiceBinder>) -> &mut Self {
        let key = TypeId::of::<CodeFirstServiceMethodProvider>();
        if self.contains(key) {
            tracing::debug!("Code-first RPC support is already registered");
        } else {
            self.add_singleton(key, Arc::new(CodeFirstServiceMethodProvider::new(binder)));
            tracing::info!("Registered code-first RPC support");
        }
        self
    }

    /// The provider registered by [`add_code_first_rpc`](Self::add_code_first_rpc).
    fn code_first_provider(&self) -> Option<Arc<CodeFirstServiceMethodProvider>> {
        self.get(TypeId::of::<CodeFirstServiceMethodProvider>())?
            .downcast::<CodeFirstServiceMethodProvider>()
            .ok()
    }
}

impl<T: ServiceCollection + ?Sized> CodeFirstRpcExt for T {}
