use super::{Annotation, ContractDefinition, ContractInfo, MethodSignature, Reflect};
use crate::{AnyValue, Args, RpcError, erase};
use std::{collections::HashMap, fmt, sync::Arc};

/// Calls one method on a service instance with erased arguments.
pub type Invoker<S> = Arc<dyn Fn(&S, Args) -> Result<AnyValue, RpcError> + Send + Sync>;

/// Functions callable as a method of `S`, with their parameters `Params`.
///
/// Implemented for `Fn(&S, A, B, ..) -> R` up to four arguments, which covers
/// both inherent service methods (`Self::say_hello`) and trait methods
/// (`<S as Greeter>::say_hello`).
pub trait IntoInvoker<S, Params>: Send + Sync + 'static {
    fn signature(name: &'static str) -> MethodSignature;

    fn into_invoker(self) -> Invoker<S>;
}

macro_rules! impl_into_invoker {
    ($($param:ident),*) => {
        impl<S, F, R, $($param,)*> IntoInvoker<S, ($($param,)*)> for F
        where
            S: 'static,
            F: Fn(&S, $($param),*) -> R + Send + Sync + 'static,
            R: Reflect,
            $($param: Reflect,)*
        {
            fn signature(name: &'static str) -> MethodSignature {
                MethodSignature::new(
                    name,
                    vec![$(<$param as Reflect>::type_desc()),*],
                    R::type_desc(),
                )
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_invoker(self) -> Invoker<S> {
                Arc::new(move |service: &S, mut args: Args| {
                    $(let $param = args.take::<$param>()?;)*
                    Ok(erase((self)(service, $($param),*)))
                })
            }
        }
    };
}

impl_into_invoker!();
impl_into_invoker!(A1);
impl_into_invoker!(A1, A2);
impl_into_invoker!(A1, A2, A3);
impl_into_invoker!(A1, A2, A3, A4);

/// A contract definition together with the invokers that implement it for `S`.
pub struct ContractImplementation<S> {
    definition: ContractDefinition,
    invokers: HashMap<&'static str, Invoker<S>>,
}

impl<S: 'static> ContractImplementation<S> {
    pub fn new(definition: ContractDefinition) -> Self {
        Self {
            definition,
            invokers: HashMap::new(),
        }
    }

    /// A class contract for `S` with no operations yet.
    pub fn class() -> Self {
        Self::new(ContractDefinition::new(ContractInfo::class(
            std::any::type_name::<S>(),
        )))
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.definition.info.annotations.push(annotation);
        self
    }

    /// Attaches the implementation of an already-declared method.
    pub fn with_invoker<P, F>(mut self, name: &'static str, method: F) -> Self
    where
        F: IntoInvoker<S, P>,
    {
        self.invokers.insert(name, method.into_invoker());
        self
    }

    /// Declares a method that is part of the type but not an operation.
    pub fn method<P, F>(self, name: &'static str, method: F) -> Self
    where
        F: IntoInvoker<S, P>,
    {
        self.method_with(name, method, std::iter::empty())
    }

    /// Declares a method and opts it in as an operation.
    pub fn operation<P, F>(self, name: &'static str, method: F) -> Self
    where
        F: IntoInvoker<S, P>,
    {
        self.method_with(name, method, [Annotation::OperationContract { name: None }])
    }

    /// Declares an operation with an explicit wire name.
    pub fn named_operation<P, F>(self, name: &'static str, operation: &str, method: F) -> Self
    where
        F: IntoInvoker<S, P>,
    {
        self.method_with(name, method, [Annotation::operation_contract(operation)])
    }

    pub fn method_with<P, F, I>(mut self, name: &'static str, method: F, annotations: I) -> Self
    where
        F: IntoInvoker<S, P>,
        I: IntoIterator<Item = Annotation>,
    {
        let mut signature = F::signature(name);
        for annotation in annotations {
            signature.annotations.push(annotation);
        }
        self.definition.methods.push(signature);
        self.with_invoker(name, method)
    }

    pub fn definition(&self) -> &ContractDefinition {
        &self.definition
    }

    pub fn invoker(&self, name: &str) -> Option<Invoker<S>> {
        self.invokers.get(name).cloned()
    }
}

impl<S> fmt::Debug for ContractImplementation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractImplementation")
            .field("definition", &self.definition)
            .field("invokers", &self.invokers.keys().collect::<Vec<_>>())
            .finish()
    }
}
