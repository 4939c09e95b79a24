use crate::{AnyValue, RpcError, TypeDesc};
use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    sync::{Mutex, PoisonError},
};

pub type SerializeFn = fn(&(dyn Any + Send)) -> Result<Vec<u8>, RpcError>;
pub type DeserializeFn = fn(&[u8]) -> Result<AnyValue, RpcError>;

/// Converts one payload type to bytes and back.
///
/// Marshallers operate on erased values so the transport can treat every
/// method uniformly; the function pointers are monomorphized per type.
#[derive(Clone, Copy)]
pub struct Marshaller {
    type_name: &'static str,
    serialize: SerializeFn,
    deserialize: DeserializeFn,
}

impl Marshaller {
    pub const fn new(
        type_name: &'static str,
        serialize: SerializeFn,
        deserialize: DeserializeFn,
    ) -> Self {
        Self {
            type_name,
            serialize,
            deserialize,
        }
    }

    /// The Protocol Buffers marshaller for `T`.
    pub fn prost<T>() -> Self
    where
        T: prost::Message + Default + 'static,
    {
        Self::new(
            std::any::type_name::<T>(),
            serialize_prost::<T>,
            deserialize_prost::<T>,
        )
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn serialize(&self, value: &(dyn Any + Send)) -> Result<Vec<u8>, RpcError> {
        (self.serialize)(value)
    }

    pub fn deserialize(&self, bytes: &[u8]) -> Result<AnyValue, RpcError> {
        (self.deserialize)(bytes)
    }
}

impl fmt::Debug for Marshaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Marshaller")
            .field("type_name", &self.type_name)
            .finish()
    }
}

fn serialize_prost<T>(value: &(dyn Any + Send)) -> Result<Vec<u8>, RpcError>
where
    T: prost::Message + 'static,
{
    value
        .downcast_ref::<T>()
        .map(prost::Message::encode_to_vec)
        .ok_or_else(RpcError::type_mismatch::<T>)
}

fn deserialize_prost<T>(bytes: &[u8]) -> Result<AnyValue, RpcError>
where
    T: prost::Message + Default + 'static,
{
    T::decode(bytes)
        .map(|message| Box::new(message) as AnyValue)
        .map_err(|e| RpcError::Codec(format!("{}: {}", std::any::type_name::<T>(), e)))
}

/// Marshallers resolved per payload type, built at most once each.
#[derive(Debug, Default)]
pub struct MarshallerCache {
    marshallers: Mutex<HashMap<TypeId, Marshaller>>,
}

impl MarshallerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached marshaller for `desc`, resolving it on first use.
    ///
    /// `None` when the type carries no marshaller (not a message type).
    pub fn resolve(&self, desc: &TypeDesc) -> Option<Marshaller> {
        let type_id = desc.type_id()?;
        let mut marshallers = self
            .marshallers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(marshaller) = marshallers.get(&type_id) {
            return Some(*marshaller);
        }
        let marshaller = desc.marshaller()?;
        marshallers.insert(type_id, marshaller);
        Some(marshaller)
    }

    pub fn len(&self) -> usize {
        self.marshallers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
