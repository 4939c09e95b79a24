mod call_invoker;
mod registrar;
mod rpc_method;

pub use call_invoker::{AsyncStreamingCall, AsyncUnaryCall, CallCompletion, CallInvoker};
pub use registrar::{
    ClientStreamingServerMethod, DuplexStreamingServerMethod, ServerStreamingServerMethod,
    ServiceMethodProvider, ServiceMethodRegistrar, UnaryServerMethod,
};
pub use rpc_method::{MethodReference, RpcMethod};
