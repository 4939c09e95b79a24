use crate::proxy_builder::build_dispatch_table;
use protocall::{
    CallInvoker, ClientProxy, Contract, ContractError, DispatchTable, MarshallerCache, TypeCache,
};
use std::{fmt, marker::PhantomData, sync::Arc};

/// Creates client proxies for contract `C`.
///
/// Built once per contract by [`ProxyRegistry::factory`]; every proxy it
/// creates shares the same dispatch table.
pub struct ProxyFactory<C: ?Sized> {
    table: Arc<DispatchTable>,
    _contract: PhantomData<fn(&C)>,
}

impl<C: Contract + ?Sized> ProxyFactory<C> {
    fn build(marshallers: &MarshallerCache) -> Result<Self, ContractError> {
        let definition = C::contract();
        let table = build_dispatch_table(&definition, marshallers)?;
        tracing::info!(
            "Built client proxy factory for {} ({} methods)",
            table.service_name(),
            table.len()
        );
        Ok(Self {
            table: Arc::new(table),
            _contract: PhantomData,
        })
    }

    /// A live implementation of `C` issuing calls through `invoker`.
    pub fn create(&self, invoker: Arc<dyn CallInvoker>) -> Box<C> {
        C::from_proxy(self.proxy(invoker))
    }

    pub fn proxy(&self, invoker: Arc<dyn CallInvoker>) -> ClientProxy<C> {
        ClientProxy::new(self.table.clone(), invoker)
    }

    pub fn service_name(&self) -> &str {
        self.table.service_name()
    }

    pub fn dispatch_table(&self) -> &Arc<DispatchTable> {
        &self.table
    }
}

impl<C: ?Sized> fmt::Debug for ProxyFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyFactory")
            .field("table", &self.table)
            .finish()
    }
}

/// Client proxy factories, one per contract type, built on first use.
///
/// ```rust,ignore
/// let registry = ProxyRegistry::new();
/// let greeter: Box<dyn Greeter> = registry.create::<dyn Greeter>(invoker)?;
/// let reply = greeter.say_hello(HelloRequest::new("World")).await?;
/// ```
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    factories: TypeCache,
    marshallers: Arc<MarshallerCache>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares a marshaller cache with other registries or binders.
    pub fn with_marshallers(marshallers: Arc<MarshallerCache>) -> Self {
        Self {
            factories: TypeCache::new(),
            marshallers,
        }
    }

    /// The factory for `C`, building it on first use.
    ///
    /// Concurrent first callers share a single build. A failed build is not
    /// cached; the next call reports the same error again.
    pub fn factory<C: Contract + ?Sized>(&self) -> Result<Arc<ProxyFactory<C>>, ContractError> {
        self.factories
            .get_or_try_insert_with::<C, ProxyFactory<C>, _, _>(|| {
                ProxyFactory::build(&self.marshallers)
            })
    }

    /// Creates a proxy for `C` over `invoker`.
    pub fn create<C: Contract + ?Sized>(
        &self,
        invoker: Arc<dyn CallInvoker>,
    ) -> Result<Box<C>, ContractError> {
        Ok(self.factory::<C>()?.create(invoker))
    }

    /// How many factory builds have run.
    pub fn build_count(&self) -> usize {
        self.factories.build_count()
    }

    pub fn marshallers(&self) -> &Arc<MarshallerCache> {
        &self.marshallers
    }
}
