use xxhash_rust::const_xxh3::xxh3_64 as const_xxh3_64;

pub const fn method_id_hash(name: &str) -> u64 {
    const_xxh3_64(name.as_bytes())
}

/// Compile-time RPC method ID generator using xxHash3.
///
/// Hashes a full method name (`/{service}/{operation}`) at **compile time**.
/// The result equals [`MethodReference::method_id`](crate::MethodReference::method_id)
/// for the same name, so transports can route with `match` arms on constants.
///
/// ```rust
/// use protocall::rpc_method_id;
/// let id_1 = rpc_method_id!("/Greet.Greeter/SayHello");
/// let id_2 = rpc_method_id!("/Greet.Greeter/SayHellos");
/// assert_ne!(id_1, id_2);
/// ```
#[macro_export]
macro_rules! rpc_method_id {
    ($name:literal) => {{
        const ID: u64 = $crate::method_id_hash($name);
        ID
    }};
}

/// Marks Protocol Buffers message types as contract payloads.
///
/// ```rust,ignore
/// #[derive(Clone, PartialEq, prost::Message)]
/// pub struct HelloRequest {
///     #[prost(string, tag = "1")]
///     pub name: String,
/// }
///
/// protocall::rpc_message!(HelloRequest);
/// ```
#[macro_export]
macro_rules! rpc_message {
    ($($message:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $message {
                fn type_desc() -> $crate::TypeDesc {
                    $crate::TypeDesc::message::<$message>()
                }
            }
        )+
    };
}

/// Declares a service contract trait.
///
/// Besides the trait itself this generates:
///
/// - `impl Contract for dyn Trait`, describing every method;
/// - `impl Trait for ClientProxy<dyn Trait>`, so proxies built by a client
///   registry are live implementations;
/// - `<dyn Trait>::implementation::<S>()`, binding each method to `S`'s
///   implementation for the server binder.
///
/// The service name defaults to the trait's module path and can be set with
/// `as "Name"` after the trait name. Operation names default to the method
/// name in PascalCase without a trailing `Async`, and can be set with
/// `as "Name"` after the return type.
///
/// Every return type must be one a client can produce: `Result<T, RpcError>`,
/// `Task<T>`, `ValueTask<T>` or `ResponseStream<T>`.
///
/// ```rust,ignore
/// protocall::service_contract! {
///     pub trait Greeter as "Greet.Greeter" {
///         fn say_hello_async(&self, request: HelloRequest, context: CallContext)
///             -> ValueTask<HelloReply>;
///         fn say_hellos(&self, request: HelloRequest) -> ResponseStream<HelloReply>;
///     }
/// }
/// ```
#[macro_export]
macro_rules! service_contract {
    (
        $(#[$attr:meta])*
        $vis:vis trait $name:ident $(as $service:literal)? {
            $(
                $(#[$method_attr:meta])*
                fn $method:ident(&self $(, $arg:ident : $arg_ty:ty)* $(,)?) -> $ret:ty
                    $(as $operation:literal)?;
            )*
        }
    ) => {
        $(#[$attr])*
        $vis trait $name: ::core::marker::Send + ::core::marker::Sync + 'static {
            $(
                $(#[$method_attr])*
                fn $method(&self $(, $arg: $arg_ty)*) -> $ret;
            )*
        }

        impl $crate::Contract for dyn $name {
            fn contract() -> $crate::ContractDefinition {
                let service_name: ::core::option::Option<&str> = ::core::option::Option::None;
                $(let service_name = ::core::option::Option::Some($service);)?

                $crate::ContractDefinition::new($crate::ContractInfo::interface(
                    concat!(module_path!(), "::", stringify!($name)),
                    service_name,
                ))
                $(
                    .with_method(
                        $crate::MethodSignature::new(
                            stringify!($method),
                            vec![$(<$arg_ty as $crate::Reflect>::type_desc()),*],
                            <$ret as $crate::Reflect>::type_desc(),
                        )
                        $(.with_annotation($crate::Annotation::operation_contract($operation)))?
                    )
                )*
            }

            fn from_proxy(
                proxy: $crate::ClientProxy<Self>,
            ) -> ::std::boxed::Box<Self> {
                ::std::boxed::Box::new(proxy)
            }
        }

        impl $name for $crate::ClientProxy<dyn $name> {
            $(
                fn $method(&self $(, $arg: $arg_ty)*) -> $ret {
                    self.invoke(
                        stringify!($method),
                        $crate::Args::from(::std::vec![$($crate::erase($arg)),*]),
                    )
                }
            )*
        }

        impl dyn $name {
            /// Binds every method of this contract to `S`'s implementation.
            #[allow(dead_code)]
            pub fn implementation<S: $name>() -> $crate::ContractImplementation<S> {
                $crate::ContractImplementation::new(
                    <dyn $name as $crate::Contract>::contract(),
                )
                $(.with_invoker(stringify!($method), <S as $name>::$method))*
            }
        }
    };
}
