use super::{CallOutcome, ClientReturn};
use crate::{Args, CallInvoker, RpcError};
use std::{collections::HashMap, fmt, marker::PhantomData, sync::Arc};

/// A prepared call for one contract method.
pub type ClientThunk = Arc<dyn Fn(&dyn CallInvoker, Args) -> CallOutcome + Send + Sync>;

/// Client thunks of one contract, keyed by the Rust method name.
pub struct DispatchTable {
    service_name: String,
    thunks: HashMap<&'static str, ClientThunk>,
}

impl DispatchTable {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            thunks: HashMap::new(),
        }
    }

    pub fn insert(&mut self, method: &'static str, thunk: ClientThunk) {
        self.thunks.insert(method, thunk);
    }

    pub fn get(&self, method: &str) -> Option<&ClientThunk> {
        self.thunks.get(method)
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    pub fn methods(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.thunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.thunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thunks.is_empty()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("service_name", &self.service_name)
            .field("methods", &self.thunks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Client implementation of contract `C`, dispatching every method call
/// through a shared table onto a [`CallInvoker`].
///
/// `service_contract!` implements the contract trait for
/// `ClientProxy<dyn Trait>`.
pub struct ClientProxy<C: ?Sized> {
    table: Arc<DispatchTable>,
    invoker: Arc<dyn CallInvoker>,
    _contract: PhantomData<fn(&C)>,
}

impl<C: ?Sized> ClientProxy<C> {
    pub fn new(table: Arc<DispatchTable>, invoker: Arc<dyn CallInvoker>) -> Self {
        Self {
            table,
            invoker,
            _contract: PhantomData,
        }
    }

    /// Runs the thunk registered for `method` and reshapes its outcome.
    pub fn invoke<R: ClientReturn>(&self, method: &'static str, args: Args) -> R {
        let outcome = match self.table.get(method) {
            Some(thunk) => thunk(self.invoker.as_ref(), args),
            None => CallOutcome::failed(RpcError::unsupported(format!(
                "{}::{}",
                self.table.service_name(),
                method
            ))),
        };
        R::from_outcome(outcome)
    }

    pub fn service_name(&self) -> &str {
        self.table.service_name()
    }

    pub fn dispatch_table(&self) -> &Arc<DispatchTable> {
        &self.table
    }
}

impl<C: ?Sized> Clone for ClientProxy<C> {
    fn clone(&self) -> Self {
        Self::new(self.table.clone(), self.invoker.clone())
    }
}

impl<C: ?Sized> fmt::Display for ClientProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table.service_name())
    }
}

impl<C: ?Sized> fmt::Debug for ClientProxy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientProxy")
            .field("service_name", &self.table.service_name())
            .finish_non_exhaustive()
    }
}
