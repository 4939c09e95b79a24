use protocall::ContractImplementation;

/// A service implementation the binder can expose.
///
/// ```rust,ignore
/// struct GreeterService;
///
/// impl Greeter for GreeterService { /* ... */ }
///
/// impl RpcService for GreeterService {
///     fn implemented_contracts() -> Vec<ContractImplementation<Self>> {
///         vec![<dyn Greeter>::implementation::<Self>()]
///     }
/// }
/// ```
pub trait RpcService: Send + Sync + Sized + 'static {
    /// The service type's own contract.
    ///
    /// Its annotations become endpoint metadata for every bound method, and
    /// methods declared here must opt in with
    /// [`ContractImplementation::operation`] to be exposed.
    fn class_contract() -> ContractImplementation<Self> {
        ContractImplementation::class()
    }

    /// The interface contracts this service implements.
    fn implemented_contracts() -> Vec<ContractImplementation<Self>> {
        Vec::new()
    }
}
