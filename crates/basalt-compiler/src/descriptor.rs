//! Runtime type-descriptor labels.

use basalt_core::{Diagnostic, DiagnosticKind};
use basalt_registry::{Type, TypeArena, TypeId};

use crate::codegen::runtime;

/// Label of a struct's static descriptor.
pub fn struct_label(name: &str) -> String {
    format!("_t{name}")
}

/// Label of a global variable's storage slot.
pub fn global_label(name: &str) -> String {
    format!("_v{name}")
}

/// Label of a function's entry point.
pub fn function_label(name: &str) -> String {
    format!("_f{name}")
}

/// The descriptor label a struct field or array element of type `ty` points at.
///
/// Int, Float and String map to the runtime's well-known descriptors, a struct
/// to its own descriptor, an array to its vector descriptor. Anything else
/// cannot be stored in a field or array.
pub fn type_descriptor(types: &TypeArena, ty: TypeId) -> Result<String, Diagnostic> {
    match types.get(ty) {
        None => Err(Diagnostic::new(
            DiagnosticKind::NullType,
            format!("{ty} does not exist"),
        )),
        Some(Type::Int) => Ok(runtime::INT_TYPE.to_string()),
        Some(Type::Float) => Ok(runtime::FLOAT_TYPE.to_string()),
        Some(Type::String) => Ok(runtime::STRING_TYPE.to_string()),
        Some(Type::Struct(s)) => Ok(struct_label(&s.name)),
        Some(Type::Vector(v)) => Ok(v.label.clone()),
        Some(other) => Err(Diagnostic::unknown_type(format!(
            "{other} has no runtime descriptor"
        ))),
    }
}
