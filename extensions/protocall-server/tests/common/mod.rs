#![allow(dead_code)]

use example_protocall_service_definition::{AllShapes, Greeter, HelloReply, HelloRequest, Ping, Pong};
use futures::{StreamExt, TryStreamExt};
use protocall::{
    CallContext, CallOptions, ContractImplementation, ResponseStream, RpcError, ServerCallContext,
    StreamReader, StreamWriter, Task, ValueTask,
};
use protocall_server::RpcService;

/// Implements every shape of `AllShapes`.
pub struct ShapesService;

impl AllShapes for ShapesService {
    fn blocking_unary(&self, request: Ping) -> Result<Pong, RpcError> {
        Ok(request.into())
    }

    fn task_unary(&self, request: Ping, _options: CallOptions) -> Task<Pong> {
        Task::from_value(request.into())
    }

    fn value_task_unary_async(&self, request: Ping, context: CallContext) -> ValueTask<Pong> {
        let mut pong = Pong::from(request);
        if context.is_server() {
            pong.label.push_str("@server");
        }
        ValueTask::from_value(pong)
    }

    fn client_streaming(&self, requests: StreamReader<Ping>) -> Task<Pong> {
        Task::new(
            requests.try_fold(Pong::default(), |mut total, ping| async move {
                total.id += ping.id;
                total.label.push_str(&ping.label);
                Ok(total)
            }),
        )
    }

    fn server_streaming(&self, request: Ping) -> ResponseStream<Pong> {
        ResponseStream::from_items((0..3).map(move |i| Pong {
            id: request.id + i,
            label: request.label.clone(),
        }))
    }

    fn duplex(&self, requests: StreamReader<Ping>, _context: CallContext) -> ResponseStream<Pong> {
        ResponseStream::new(requests.map_ok(Pong::from))
    }

    fn renamed(&self, request: Ping) -> Task<Pong> {
        Task::from_value(Pong {
            id: request.id,
            label: format!("relabeled:{}", request.label),
        })
    }

    fn server_streaming_writer(
        &self,
        request: Ping,
        mut responses: StreamWriter<Pong>,
        context: ServerCallContext,
    ) -> Task<()> {
        Task::new(async move {
            for i in 0..2 {
                responses
                    .write(Pong {
                        id: request.id + i,
                        label: context.method.clone(),
                    })
                    .await?;
            }
            Ok(())
        })
    }

    fn duplex_writer(
        &self,
        mut requests: StreamReader<Ping>,
        mut responses: StreamWriter<Pong>,
    ) -> Task<()> {
        Task::new(async move {
            while let Some(ping) = requests.next().await {
                responses.write(ping?.into()).await?;
            }
            Ok(())
        })
    }

    fn echo_number(&self, value: i32) -> Task<i32> {
        Task::from_value(value)
    }

    fn is_valid(&self, count: i32, label: String) -> Result<bool, RpcError> {
        Ok(count > 0 && !label.is_empty())
    }
}

impl RpcService for ShapesService {
    fn implemented_contracts() -> Vec<ContractImplementation<Self>> {
        vec![<dyn AllShapes>::implementation::<Self>()]
    }
}

pub struct GreeterService;

impl Greeter for GreeterService {
    fn say_hello(&self, request: HelloRequest) -> Task<HelloReply> {
        Task::from_value(HelloReply {
            message: format!("Hello {}", request.name),
        })
    }

    fn say_hellos(&self, request: HelloRequest, context: CallContext) -> ResponseStream<HelloReply> {
        let greetings = ["Hello", "Hi", "Hey"].map(|greeting| HelloReply {
            message: format!("{} {}", greeting, request.name),
        });
        // Only a server-side context reaches a bound implementation.
        let count = if context.is_server() { greetings.len() } else { 0 };
        ResponseStream::from_items(greetings.into_iter().take(count))
    }
}

impl RpcService for GreeterService {
    fn implemented_contracts() -> Vec<ContractImplementation<Self>> {
        vec![<dyn Greeter>::implementation::<Self>()]
    }
}
