use super::{Annotation, Annotations, MethodSignature};
use crate::ClientProxy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// A trait declared with `service_contract!`; methods are eligible by structure.
    Interface,
    /// A concrete service type; methods must opt in individually.
    Class,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractInfo {
    pub kind: ContractKind,
    /// Fully qualified Rust path of the contract type.
    pub type_name: &'static str,
    pub annotations: Annotations,
}

impl ContractInfo {
    pub fn new(kind: ContractKind, type_name: &'static str) -> Self {
        Self {
            kind,
            type_name,
            annotations: Annotations::new(),
        }
    }

    /// An interface tagged as a service contract.
    pub fn interface(type_name: &'static str, service_name: Option<&str>) -> Self {
        Self::new(ContractKind::Interface, type_name).with_annotation(
            Annotation::ServiceContract {
                name: service_name.map(str::to_string),
            },
        )
    }

    pub fn class(type_name: &'static str) -> Self {
        Self::new(ContractKind::Class, type_name)
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ContractKind::Interface
    }
}

/// Everything known about a contract type: its info plus method signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractDefinition {
    pub info: ContractInfo,
    pub methods: Vec<MethodSignature>,
}

impl ContractDefinition {
    pub fn new(info: ContractInfo) -> Self {
        Self {
            info,
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: MethodSignature) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodSignature> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Implemented for `dyn Trait` by [`service_contract!`](crate::service_contract).
pub trait Contract: 'static {
    fn contract() -> ContractDefinition;

    /// Wraps a dispatching proxy as a live implementation of the contract.
    fn from_proxy(proxy: ClientProxy<Self>) -> Box<Self>;
}
