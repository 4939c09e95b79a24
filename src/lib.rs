//! Code-first RPC contracts.
//!
//! Plain Rust traits and service types become RPC contracts: method
//! signatures are reflected into a small type model, classified into call
//! shapes (unary, client streaming, server streaming, duplex), and bound to a
//! transport through prepared, type-erased thunks.
//!
//! The client and server halves live in the `protocall-client` and
//! `protocall-server` extension crates; this crate holds everything they
//! share.

pub mod codec;
pub mod constants;
pub mod context;
pub mod contract;
pub mod dispatch;
mod erased;
pub mod error;
mod macros;
pub mod registry;
pub mod streaming;
pub mod transport;

pub use codec::{Marshaller, MarshallerCache};
pub use context::*;
pub use contract::*;
pub use dispatch::*;
pub use erased::{AnyValue, Args, ErasedFuture, ErasedStream, downcast, erase};
pub use error::{ContractError, RpcError};
pub use macros::method_id_hash;
pub use registry::TypeCache;
pub use streaming::*;
pub use transport::*;

pub use tokio_util::sync::CancellationToken;
