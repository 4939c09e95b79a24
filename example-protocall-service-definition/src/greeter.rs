use crate::{HelloReply, HelloRequest};
use protocall::{CallContext, ResponseStream, Task, service_contract};

service_contract! {
    /// Greets callers by name.
    pub trait Greeter as "Greet.Greeter" {
        fn say_hello(&self, request: HelloRequest) -> Task<HelloReply>;

        /// One reply per greeting the server decides to send.
        fn say_hellos(&self, request: HelloRequest, context: CallContext)
            -> ResponseStream<HelloReply>;
    }
}
