mod all_shapes;
mod greeter;
mod messages;

pub use all_shapes::AllShapes;
pub use greeter::Greeter;
pub use messages::{HelloReply, HelloRequest, Ping, Pong};
