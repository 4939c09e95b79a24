//! Maps method signatures onto RPC call shapes.
//!
//! A trailing context parameter is peeled off first; the remaining
//! parameters and the return type are then tried against the rule table in order,
//! and the first rule that matches decides the shape.

use super::{
    CallKind, CallShape, ContextKind, GenericKind, MethodSignature, ResponseShape, TypeDesc,
};
use crate::{CallContext, CallOptions, ServerCallContext, Task};

/// One position in a rule's parameter list or its return type.
#[derive(Clone, Copy)]
enum Template {
    /// Any concrete, non-context type. Recorded.
    Payload,
    /// Exactly the given type.
    Exact(fn() -> TypeDesc),
    /// Any closed form of the generic. Its argument is recorded.
    Open(GenericKind),
}

impl Template {
    fn matches(&self, actual: &TypeDesc, captures: &mut Vec<TypeDesc>) -> bool {
        match self {
            Template::Payload => {
                let is_payload =
                    matches!(actual, TypeDesc::Concrete(_)) && context_kind_of(actual).is_none();
                if is_payload {
                    captures.push(actual.clone());
                }
                is_payload
            }
            Template::Exact(expected) => expected() == *actual,
            Template::Open(kind) => match actual {
                TypeDesc::Closed {
                    kind: actual_kind,
                    argument,
                    ..
                } if actual_kind == kind => {
                    captures.push((**argument).clone());
                    true
                }
                _ => false,
            },
        }
    }
}

struct Rule {
    params: &'static [Template],
    returns: Template,
    call_kind: CallKind,
    response_shape: ResponseShape,
    response_writer: bool,
}

impl Rule {
    /// Every rule records the request type first and the response type second.
    fn apply(
        &self,
        params: &[TypeDesc],
        returns: &TypeDesc,
        context_kind: ContextKind,
    ) -> Option<CallShape> {
        if params.len() != self.params.len() {
            return None;
        }

        let mut captures = Vec::with_capacity(2);
        for (template, actual) in self.params.iter().zip(params) {
            if !template.matches(actual, &mut captures) {
                return None;
            }
        }
        if !self.returns.matches(returns, &mut captures) {
            return None;
        }

        let mut captures = captures.into_iter();
        let (request_type, response_type) = (captures.next()?, captures.next()?);
        Some(CallShape {
            call_kind: self.call_kind,
            context_kind,
            response_shape: self.response_shape,
            response_writer: self.response_writer,
            request_type,
            response_type,
        })
    }
}

fn unit_task() -> TypeDesc {
    TypeDesc::of::<Task<()>>()
}

static RULES: &[Rule] = &[
    // (StreamReader<Req>) -> Task<Resp> | ValueTask<Resp>
    Rule {
        params: &[Template::Open(GenericKind::StreamReader)],
        returns: Template::Open(GenericKind::Task),
        call_kind: CallKind::ClientStreaming,
        response_shape: ResponseShape::Deferred,
        response_writer: false,
    },
    Rule {
        params: &[Template::Open(GenericKind::StreamReader)],
        returns: Template::Open(GenericKind::ValueTask),
        call_kind: CallKind::ClientStreaming,
        response_shape: ResponseShape::LightDeferred,
        response_writer: false,
    },
    // (Req) -> Resp | Result<Resp, RpcError>
    Rule {
        params: &[Template::Payload],
        returns: Template::Payload,
        call_kind: CallKind::Unary,
        response_shape: ResponseShape::Sync,
        response_writer: false,
    },
    Rule {
        params: &[Template::Payload],
        returns: Template::Open(GenericKind::Fallible),
        call_kind: CallKind::Unary,
        response_shape: ResponseShape::Sync,
        response_writer: false,
    },
    // (Req) -> Task<Resp> | ValueTask<Resp>
    Rule {
        params: &[Template::Payload],
        returns: Template::Open(GenericKind::Task),
        call_kind: CallKind::Unary,
        response_shape: ResponseShape::Deferred,
        response_writer: false,
    },
    Rule {
        params: &[Template::Payload],
        returns: Template::Open(GenericKind::ValueTask),
        call_kind: CallKind::Unary,
        response_shape: ResponseShape::LightDeferred,
        response_writer: false,
    },
    // (StreamReader<Req>, StreamWriter<Resp>) -> Task<()>
    Rule {
        params: &[
            Template::Open(GenericKind::StreamReader),
            Template::Open(GenericKind::StreamWriter),
        ],
        returns: Template::Exact(unit_task),
        call_kind: CallKind::DuplexStreaming,
        response_shape: ResponseShape::Deferred,
        response_writer: true,
    },
    // (StreamReader<Req>) -> ResponseStream<Resp>
    Rule {
        params: &[Template::Open(GenericKind::StreamReader)],
        returns: Template::Open(GenericKind::ResponseStream),
        call_kind: CallKind::DuplexStreaming,
        response_shape: ResponseShape::Streamed,
        response_writer: false,
    },
    // (Req, StreamWriter<Resp>) -> Task<()>
    Rule {
        params: &[Template::Payload, Template::Open(GenericKind::StreamWriter)],
        returns: Template::Exact(unit_task),
        call_kind: CallKind::ServerStreaming,
        response_shape: ResponseShape::Deferred,
        response_writer: true,
    },
    // (Req) -> ResponseStream<Resp>
    Rule {
        params: &[Template::Payload],
        returns: Template::Open(GenericKind::ResponseStream),
        call_kind: CallKind::ServerStreaming,
        response_shape: ResponseShape::Streamed,
        response_writer: false,
    },
];

/// Context kind of `desc` when it is one of the recognised context types.
pub fn context_kind_of(desc: &TypeDesc) -> Option<ContextKind> {
    if desc.is::<CallContext>() {
        Some(ContextKind::UnifiedContext)
    } else if desc.is::<ServerCallContext>() {
        Some(ContextKind::ServerContext)
    } else if desc.is::<CallOptions>() {
        Some(ContextKind::PlainOptions)
    } else {
        None
    }
}

/// Classifies `signature`, or returns `None` when it matches no call shape.
///
/// Generic method definitions never match.
pub fn classify(signature: &MethodSignature) -> Option<CallShape> {
    if signature.is_generic_definition() {
        return None;
    }

    let (params, context_kind) = match signature.params.split_last() {
        Some((last, rest)) => match context_kind_of(last) {
            Some(kind) => (rest, kind),
            None => (signature.params.as_slice(), ContextKind::None),
        },
        None => (signature.params.as_slice(), ContextKind::None),
    };

    RULES
        .iter()
        .find_map(|rule| rule.apply(params, &signature.returns, context_kind))
}
