//! Interfaces between the exploration engine and its host
//!
//! The engine never touches memory or parses expressions itself. Everything it
//! knows about the inspected program comes through these traits:
//!
//! - [`TypeHandle`]: a type, with its code, display name, target and fields
//! - [`ValueHandle`]: a lazily-read value that can be rendered, dereferenced,
//!   indexed, cast and projected onto a field
//! - [`Inspector`]: turns user-entered text into values and types
//! - [`Console`]: line-oriented terminal I/O
//!
//! Handles are cheap to clone and never cache what they read, so a value is
//! re-read from memory every time it is rendered.

use super::category::{classify, Category};
use super::errors::InspectError;
use std::fmt;

/// Fine-grained type codes reported by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Char,
    Int,
    Bool,
    Float,
    Void,
    Enum,
    Struct,
    Union,
    Ptr,
    Ref,
    RvalueRef,
    Typedef,
    Array,
    Func,
    Other,
}

/// A struct/union member as the engine sees it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor<T> {
    pub name: String,
    pub ty: T,
    /// Compiler-synthesized; never displayed or offered
    pub is_artificial: bool,
    /// A base-class subobject rather than a declared field
    pub is_base_class: bool,
}

pub trait TypeHandle: Clone + fmt::Display {
    fn code(&self) -> TypeCode;

    fn category(&self) -> Category {
        classify(self.code())
    }

    /// Pointee, referent, aliased or element type
    fn target(&self) -> Option<Self>;

    /// Members in declaration order, base classes first; empty for non-aggregates
    fn fields(&self) -> Vec<FieldDescriptor<Self>>;

    /// Resolve typedef chains to the underlying type
    fn strip_typedefs(&self) -> Self;
}

pub trait ValueHandle: Clone {
    type Type: TypeHandle;

    fn ty(&self) -> Self::Type;

    /// Display text of the current contents
    fn render(&self) -> Result<String, InspectError>;

    /// Force a read of the value's bytes
    fn fetch(&self) -> Result<(), InspectError> {
        self.render().map(|_| ())
    }

    fn dereference(&self) -> Result<Self, InspectError>;

    fn referenced_value(&self) -> Result<Self, InspectError>;

    fn index(&self, index: i64) -> Result<Self, InspectError>;

    fn cast_to(&self, ty: &Self::Type) -> Result<Self, InspectError>;

    fn field_value(&self, field: &FieldDescriptor<Self::Type>) -> Result<Self, InspectError>;
}

/// Expression evaluator and type-name resolver of the inspected program
pub trait Inspector {
    type Value: ValueHandle;

    fn evaluate_expression(&self, text: &str) -> Result<Self::Value, InspectError>;

    fn resolve_type_name(
        &self,
        text: &str,
    ) -> Result<<Self::Value as ValueHandle>::Type, InspectError>;
}

/// Line-oriented terminal
pub trait Console {
    /// Show `prompt` and read one line without its terminator
    ///
    /// End of input reads as an empty line.
    fn read_line(&mut self, prompt: &str) -> String;

    fn write(&mut self, text: &str);

    fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}
