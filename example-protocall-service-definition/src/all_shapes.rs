//! A contract declaring one method per supported call shape, plus a few that
//! a client cannot express.

use crate::{Ping, Pong};
use protocall::{
    CallContext, CallOptions, ResponseStream, RpcError, ServerCallContext, StreamReader,
    StreamWriter, Task, ValueTask, service_contract,
};

service_contract! {
    pub trait AllShapes as "Shapes.AllShapes" {
        fn blocking_unary(&self, request: Ping) -> Result<Pong, RpcError>;

        fn task_unary(&self, request: Ping, options: CallOptions) -> Task<Pong>;

        fn value_task_unary_async(&self, request: Ping, context: CallContext)
            -> ValueTask<Pong>;

        fn client_streaming(&self, requests: StreamReader<Ping>) -> Task<Pong>;

        fn server_streaming(&self, request: Ping) -> ResponseStream<Pong>;

        fn duplex(&self, requests: StreamReader<Ping>, context: CallContext)
            -> ResponseStream<Pong>;

        fn renamed(&self, request: Ping) -> Task<Pong> as "Relabel";

        // Server-only shapes; proxies answer these with `Unsupported`.
        fn server_streaming_writer(
            &self,
            request: Ping,
            responses: StreamWriter<Pong>,
            context: ServerCallContext,
        ) -> Task<()>;

        fn duplex_writer(&self, requests: StreamReader<Ping>, responses: StreamWriter<Pong>)
            -> Task<()>;

        // Classifies, but `i32` has no marshaller.
        fn echo_number(&self, value: i32) -> Task<i32>;

        // Matches no call shape.
        fn is_valid(&self, count: i32, label: String) -> Result<bool, RpcError>;
    }
}
