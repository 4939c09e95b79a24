use super::{
    ContractDefinition, ContractInfo, ContractKind, ContractOperation, MethodSignature,
    ServiceDescriptor, classify,
};
use crate::{
    ContractError,
    constants::{ASYNC_SUFFIX, RUST_PATH_SEPARATOR, SERVICE_NAME_SEPARATOR},
};
use std::collections::{HashMap, hash_map::Entry};

/// Resolves the service name for a contract type.
///
/// A non-blank `ServiceContract` name wins; otherwise the qualified type name
/// is used with its path separators normalized to dots. `None` when neither
/// yields anything.
pub fn resolve_service_name(info: &ContractInfo) -> Option<String> {
    if let Some(name) = info.annotations.service_name() {
        return Some(name.to_string());
    }

    let type_name = info.type_name.trim().trim_start_matches("dyn ");
    if type_name.is_empty() {
        return None;
    }
    Some(type_name.replace(RUST_PATH_SEPARATOR, SERVICE_NAME_SEPARATOR))
}

/// Operation name of a method: a non-blank `OperationContract` name, else the
/// method name in PascalCase with a trailing `Async` removed.
pub fn operation_name(method: &MethodSignature) -> String {
    if let Some(name) = method.annotations.operation_name() {
        return name.to_string();
    }

    let pascal = to_pascal_case(method.name);
    match pascal.strip_suffix(ASYNC_SUFFIX) {
        Some(stripped) if !stripped.is_empty() => stripped.to_string(),
        _ => pascal,
    }
}

fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Enumerates the operations `definition` exposes.
///
/// Class contracts only contribute methods that opt in with an
/// `OperationContract`; interface methods are eligible by structure alone.
/// Eligible methods matching no call shape are skipped and listed on the
/// descriptor as unmatched.
pub fn inspect(definition: &ContractDefinition) -> Result<ServiceDescriptor, ContractError> {
    let info = &definition.info;
    let service_name =
        resolve_service_name(info).ok_or(ContractError::MissingServiceName(info.type_name))?;
    let requires_opt_in = info.kind == ContractKind::Class;

    let mut operations = Vec::new();
    let mut unmatched = Vec::new();
    let mut declared_by: HashMap<String, &'static str> = HashMap::new();

    for method in &definition.methods {
        if requires_opt_in && !method.annotations.is_operation_contract() {
            continue;
        }

        let Some(shape) = classify(method) else {
            tracing::debug!(
                "Skipping {}::{}: signature matches no call shape",
                info.type_name,
                method.name
            );
            unmatched.push(method.name);
            continue;
        };

        let name = operation_name(method);
        match declared_by.entry(name.clone()) {
            Entry::Occupied(entry) => {
                return Err(ContractError::DuplicateOperation {
                    service: service_name,
                    operation: name,
                    first: *entry.get(),
                    second: method.name,
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(method.name);
            }
        }

        operations.push(ContractOperation::new(name, shape, method.clone()));
    }

    Ok(ServiceDescriptor::new(
        service_name,
        info.type_name,
        operations,
        unmatched,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case_conversion() {
        assert_eq!(to_pascal_case("say_hello"), "SayHello");
        assert_eq!(to_pascal_case("get"), "Get");
        assert_eq!(to_pascal_case("__odd__name"), "OddName");
        assert_eq!(to_pascal_case("AlreadyPascal"), "AlreadyPascal");
    }
}
