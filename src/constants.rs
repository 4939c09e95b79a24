/// The default buffer size for the MPSC channel behind [`StreamWriter::channel`].
///
/// This value represents the number of *items* the channel can hold before the
/// writer applies backpressure, not the total size in bytes.
///
/// [`StreamWriter::channel`]: crate::StreamWriter::channel
pub const DEFAULT_RPC_STREAM_CHANNEL_BUFFER_SIZE: usize = 8;

/// Suffix stripped from method names when deriving an operation name.
pub const ASYNC_SUFFIX: &str = "Async";

/// Separator used in qualified Rust paths.
pub const RUST_PATH_SEPARATOR: &str = "::";

/// Separator used between segments of a service name.
pub const SERVICE_NAME_SEPARATOR: &str = ".";
