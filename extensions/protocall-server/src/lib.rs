//! Server-side binding for code-first contracts.
//!
//! A [`ServiceBinder`] inspects a service type and the contracts it
//! implements, then adapts every operation to the handler shape the hosting
//! runtime registers for its call kind.

mod binder;
mod host;
mod service;
mod thunk;

pub use binder::{BoundServiceMethod, ServiceBinder, ServiceBinding};
pub use host::{CodeFirstRpcExt, CodeFirstServiceMethodProvider, ServiceCollection};
pub use service::RpcService;
pub use thunk::{ServerHandler, server_handler};
