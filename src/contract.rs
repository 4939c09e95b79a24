mod annotation;
mod classifier;
mod definition;
mod implementation;
mod inspector;
mod operation;
mod signature;
mod type_desc;

pub use annotation::{Annotation, Annotations, EndpointMetadata};
pub use classifier::{classify, context_kind_of};
pub use definition::{Contract, ContractDefinition, ContractInfo, ContractKind};
pub use implementation::{ContractImplementation, IntoInvoker, Invoker};
pub use inspector::{inspect, operation_name, resolve_service_name};
pub use operation::{
    CallKind, CallShape, ContextKind, ContractOperation, ResponseShape, ServiceDescriptor,
};
pub use signature::MethodSignature;
pub use type_desc::{Erasure, GenericKind, Reflect, TypeDesc, TypeInfo};
