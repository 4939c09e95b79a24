//! Client proxies for code-first contracts.
//!
//! A [`ProxyRegistry`] turns a contract declared with
//! `protocall::service_contract!` into a live implementation whose methods
//! issue calls through any [`CallInvoker`](protocall::CallInvoker).

mod proxy_builder;
mod proxy_registry;
pub mod reshape;

pub use proxy_builder::build_dispatch_table;
pub use proxy_registry::{ProxyFactory, ProxyRegistry};
