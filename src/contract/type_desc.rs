use crate::{
    AnyValue, CallContext, CallOptions, ErasedFuture, ErasedStream, Marshaller, ResponseStream,
    RpcError, ServerCallContext, StreamReader, StreamWriter, Task, ValueTask, downcast, erase,
};
use futures::{FutureExt, SinkExt, StreamExt, TryFutureExt, TryStreamExt, future};
use std::{any::TypeId, fmt};

/// Generic wrappers the classifier understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericKind {
    Task,
    ValueTask,
    /// `Result<T, RpcError>` returned from a synchronous method.
    Fallible,
    StreamReader,
    StreamWriter,
    ResponseStream,
}

/// Monomorphized adapters between a typed wrapper and its erased form.
///
/// Captured when a closed generic type is reflected, so later code can move
/// values in and out of the wrapper without knowing its argument type.
#[derive(Clone, Copy)]
pub enum Erasure {
    /// `Task<T>` or `ValueTask<T>` into a future of an erased `T`.
    Deferred(fn(AnyValue) -> Result<ErasedFuture, RpcError>),
    /// `Result<T, RpcError>` into a result of an erased `T`.
    Fallible(fn(AnyValue) -> Result<Result<AnyValue, RpcError>, RpcError>),
    Reader {
        wrap: fn(StreamReader<AnyValue>) -> AnyValue,
        unwrap: fn(AnyValue) -> Result<StreamReader<AnyValue>, RpcError>,
    },
    Writer {
        wrap: fn(StreamWriter<AnyValue>) -> AnyValue,
    },
    /// `ResponseStream<T>` into a stream of erased items.
    Stream(fn(AnyValue) -> Result<ErasedStream, RpcError>),
}

impl fmt::Debug for Erasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Erasure::Deferred(_) => "Deferred",
            Erasure::Fallible(_) => "Fallible",
            Erasure::Reader { .. } => "Reader",
            Erasure::Writer { .. } => "Writer",
            Erasure::Stream(_) => "Stream",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
    marshaller: Option<Marshaller>,
}

/// Reflected description of a parameter or return type.
#[derive(Clone)]
pub enum TypeDesc {
    Concrete(TypeInfo),
    Closed {
        kind: GenericKind,
        argument: Box<TypeDesc>,
        erasure: Erasure,
    },
}

impl TypeDesc {
    pub fn of<T: Reflect>() -> Self {
        T::type_desc()
    }

    /// A concrete type without a marshaller.
    pub fn concrete<T: 'static>() -> Self {
        TypeDesc::Concrete(TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            marshaller: None,
        })
    }

    /// A Protocol Buffers message type.
    pub fn message<T>() -> Self
    where
        T: prost::Message + Default + 'static,
    {
        TypeDesc::Concrete(TypeInfo {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            marshaller: Some(Marshaller::prost::<T>()),
        })
    }

    pub fn with_marshaller(self, marshaller: Marshaller) -> Self {
        match self {
            TypeDesc::Concrete(info) => TypeDesc::Concrete(TypeInfo {
                marshaller: Some(marshaller),
                ..info
            }),
            closed => closed,
        }
    }

    pub fn closed(kind: GenericKind, argument: TypeDesc, erasure: Erasure) -> Self {
        TypeDesc::Closed {
            kind,
            argument: Box::new(argument),
            erasure,
        }
    }

    /// `TypeId` of a concrete type; closed generics have none.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            TypeDesc::Concrete(info) => Some(info.id),
            TypeDesc::Closed { .. } => None,
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    pub fn generic_kind(&self) -> Option<GenericKind> {
        match self {
            TypeDesc::Concrete(_) => None,
            TypeDesc::Closed { kind, .. } => Some(*kind),
        }
    }

    pub fn argument(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Concrete(_) => None,
            TypeDesc::Closed { argument, .. } => Some(argument),
        }
    }

    pub fn erasure(&self) -> Option<Erasure> {
        match self {
            TypeDesc::Concrete(_) => None,
            TypeDesc::Closed { erasure, .. } => Some(*erasure),
        }
    }

    pub fn marshaller(&self) -> Option<Marshaller> {
        match self {
            TypeDesc::Concrete(info) => info.marshaller,
            TypeDesc::Closed { .. } => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            TypeDesc::Concrete(info) => info.name.to_string(),
            TypeDesc::Closed { kind, argument, .. } => format!("{:?}<{}>", kind, argument.name()),
        }
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeDesc::Concrete(a), TypeDesc::Concrete(b)) => a.id == b.id,
            (
                TypeDesc::Closed {
                    kind: a_kind,
                    argument: a_arg,
                    ..
                },
                TypeDesc::Closed {
                    kind: b_kind,
                    argument: b_arg,
                    ..
                },
            ) => a_kind == b_kind && a_arg == b_arg,
            _ => false,
        }
    }
}

impl Eq for TypeDesc {}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Types that can appear in a contract method signature.
///
/// Message types implement this through [`rpc_message!`](crate::rpc_message).
pub trait Reflect: Send + 'static {
    fn type_desc() -> TypeDesc;
}

macro_rules! impl_reflect_concrete {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::concrete::<$ty>()
                }
            }
        )*
    };
}

impl_reflect_concrete!(
    (),
    bool,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    Vec<u8>,
    CallContext,
    ServerCallContext,
    CallOptions,
);

impl<T: Reflect> Reflect for Task<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::Task,
            T::type_desc(),
            Erasure::Deferred(erase_task::<T>),
        )
    }
}

impl<T: Reflect> Reflect for ValueTask<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::ValueTask,
            T::type_desc(),
            Erasure::Deferred(erase_value_task::<T>),
        )
    }
}

impl<T: Reflect> Reflect for Result<T, RpcError> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::Fallible,
            T::type_desc(),
            Erasure::Fallible(erase_result::<T>),
        )
    }
}

impl<T: Reflect> Reflect for StreamReader<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::StreamReader,
            T::type_desc(),
            Erasure::Reader {
                wrap: wrap_reader::<T>,
                unwrap: unwrap_reader::<T>,
            },
        )
    }
}

impl<T: Reflect> Reflect for StreamWriter<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::StreamWriter,
            T::type_desc(),
            Erasure::Writer {
                wrap: wrap_writer::<T>,
            },
        )
    }
}

impl<T: Reflect> Reflect for ResponseStream<T> {
    fn type_desc() -> TypeDesc {
        TypeDesc::closed(
            GenericKind::ResponseStream,
            T::type_desc(),
            Erasure::Stream(erase_response_stream::<T>),
        )
    }
}

fn erase_task<T: Send + 'static>(value: AnyValue) -> Result<ErasedFuture, RpcError> {
    let task = downcast::<Task<T>>(value)?;
    Ok(task.map_ok(erase).boxed())
}

fn erase_value_task<T: Send + 'static>(value: AnyValue) -> Result<ErasedFuture, RpcError> {
    let task = downcast::<ValueTask<T>>(value)?;
    Ok(task.map_ok(erase).boxed())
}

fn erase_result<T: Send + 'static>(value: AnyValue) -> Result<Result<AnyValue, RpcError>, RpcError> {
    let result = downcast::<Result<T, RpcError>>(value)?;
    Ok(result.map(erase))
}

fn wrap_reader<T: Send + 'static>(reader: StreamReader<AnyValue>) -> AnyValue {
    let typed = reader.and_then(|item| future::ready(downcast::<T>(item)));
    erase(StreamReader::new(typed))
}

fn unwrap_reader<T: Send + 'static>(value: AnyValue) -> Result<StreamReader<AnyValue>, RpcError> {
    let reader = downcast::<StreamReader<T>>(value)?;
    Ok(StreamReader::new(reader.map_ok(erase)))
}

fn wrap_writer<T: Send + 'static>(writer: StreamWriter<AnyValue>) -> AnyValue {
    let typed = writer.with(|item: T| future::ready(Ok::<AnyValue, RpcError>(erase(item))));
    erase(StreamWriter::new(typed))
}

fn erase_response_stream<T: Send + 'static>(value: AnyValue) -> Result<ErasedStream, RpcError> {
    let stream = downcast::<ResponseStream<T>>(value)?;
    Ok(stream.map_ok(erase).boxed())
}
