/// Declarative markers attached to contract types and methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Tags a type as a service contract, optionally naming the service.
    ServiceContract { name: Option<String> },
    /// Opts a method in as an operation, optionally naming it.
    OperationContract { name: Option<String> },
    /// Marks the runtime's default handler; such services are never bound.
    BindServiceMethod,
    /// Free-form endpoint metadata handed to the hosting runtime.
    Custom { key: String, value: String },
}

impl Annotation {
    pub fn service_contract(name: impl Into<String>) -> Self {
        Annotation::ServiceContract {
            name: Some(name.into()),
        }
    }

    pub fn operation_contract(name: impl Into<String>) -> Self {
        Annotation::OperationContract {
            name: Some(name.into()),
        }
    }

    pub fn custom(key: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation::Custom {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations(Vec<Annotation>);

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: Annotation) {
        self.0.push(annotation);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_service_contract(&self) -> bool {
        self.iter()
            .any(|a| matches!(a, Annotation::ServiceContract { .. }))
    }

    pub fn is_operation_contract(&self) -> bool {
        self.iter()
            .any(|a| matches!(a, Annotation::OperationContract { .. }))
    }

    pub fn is_bind_service_method(&self) -> bool {
        self.iter()
            .any(|a| matches!(a, Annotation::BindServiceMethod))
    }

    /// The service name carried by a `ServiceContract`, if not blank.
    pub fn service_name(&self) -> Option<&str> {
        self.iter().find_map(|a| match a {
            Annotation::ServiceContract { name: Some(name) } => non_blank(name),
            _ => None,
        })
    }

    /// The operation name carried by an `OperationContract`, if not blank.
    pub fn operation_name(&self) -> Option<&str> {
        self.iter().find_map(|a| match a {
            Annotation::OperationContract { name: Some(name) } => non_blank(name),
            _ => None,
        })
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Annotations(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Annotations {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Endpoint metadata registered alongside a bound method.
///
/// Service-level annotations come first and method-level ones after, so a
/// lookup that takes the last match lets the method override the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMetadata {
    items: Vec<Annotation>,
}

impl EndpointMetadata {
    pub fn from_layers(service: &Annotations, method: &Annotations) -> Self {
        Self {
            items: service.iter().chain(method.iter()).cloned().collect(),
        }
    }

    pub fn items(&self) -> &[Annotation] {
        &self.items
    }

    /// Value of the most specific `Custom` annotation for `key`.
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.items.iter().rev().find_map(|a| match a {
            Annotation::Custom { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
