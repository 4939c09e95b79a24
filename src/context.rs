mod call_context;
mod call_options;
mod cancellation;
mod metadata;
mod server_call_context;
mod status;

pub use call_context::{CallContext, CallContextFlags, MetadataCapture};
pub use call_options::{CallOptions, WriteOptions};
pub use cancellation::{normalize_cancellation, with_cancellation};
pub use metadata::{BINARY_KEY_SUFFIX, Metadata, MetadataEntry, MetadataValue};
pub use server_call_context::ServerCallContext;
pub use status::{Status, StatusCode};
