use super::{Annotation, Annotations, TypeDesc};

/// Reflected shape of one contract method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: &'static str,
    pub params: Vec<TypeDesc>,
    pub returns: TypeDesc,
    /// Number of unbound generic parameters; non-zero for generic definitions.
    pub generic_params: usize,
    pub annotations: Annotations,
}

impl MethodSignature {
    pub fn new(name: &'static str, params: Vec<TypeDesc>, returns: TypeDesc) -> Self {
        Self {
            name,
            params,
            returns,
            generic_params: 0,
            annotations: Annotations::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn with_generic_params(mut self, count: usize) -> Self {
        self.generic_params = count;
        self
    }

    pub fn is_generic_definition(&self) -> bool {
        self.generic_params > 0
    }
}
