//! Type category classification
//!
//! Hosts report a fine-grained [`TypeCode`]; the dispatcher only cares about
//! the structural [`Category`] that selects a handler. [`classify`] is total:
//! every code maps to exactly one category, and codes without a handler map
//! to [`Category::Unsupported`].

use super::host::TypeCode;

/// Structural kind of a type, one per handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Scalar,
    Struct,
    Union,
    Pointer,
    Reference,
    Typedef,
    Array,
    Unsupported,
}

/// Map a host type code to the category whose handler explores it
pub fn classify(code: TypeCode) -> Category {
    match code {
        TypeCode::Char
        | TypeCode::Int
        | TypeCode::Bool
        | TypeCode::Float
        | TypeCode::Void
        | TypeCode::Enum => Category::Scalar,
        TypeCode::Struct => Category::Struct,
        TypeCode::Union => Category::Union,
        TypeCode::Ptr => Category::Pointer,
        TypeCode::Ref | TypeCode::RvalueRef => Category::Reference,
        TypeCode::Typedef => Category::Typedef,
        TypeCode::Array => Category::Array,
        TypeCode::Func | TypeCode::Other => Category::Unsupported,
    }
}
