mod call_outcome;
mod client_proxy;

pub use call_outcome::{CallOutcome, ClientReturn};
pub use client_proxy::{ClientProxy, ClientThunk, DispatchTable};
