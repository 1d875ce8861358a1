//! Memory model for the program image
//!
//! This module provides the core memory abstractions:
//! - [`space`]: Sparse address space of mapped blocks
//! - [`value`]: Scalar encoding to and from raw little-endian bytes
//!
//! # Type Sizes
//!
//! Sizes are fixed and platform-independent:
//! - `char`, `_Bool`: 1 byte
//! - `short`: 2 bytes
//! - `int`, `enum`, `float`: 4 bytes
//! - `long`, `long long`, `double`, pointers, references: 8 bytes
//! - `struct`: base classes then fields, packed (no padding or alignment)
//! - `union`: size of the largest member
//! - `void` and incomplete types: 0 bytes
//!
//! # Pointer Arithmetic
//!
//! Pointer arithmetic is scaled by pointee size:
//! ```text
//! ptr + n  →  ptr + (n * sizeof(*ptr))
//! ```

pub mod space;
pub mod value;

use crate::inspect::types::TypeDefs;
use crate::parser::ast::{CompoundKind, IntKind, Type};
use value::Address;

/// First address handed out to global variables
pub const GLOBALS_BASE: Address = 0x0060_1000;

/// First address of the read-only data block holding string literals
pub const RODATA_BASE: Address = 0x0040_0000;

/// First address handed out to function symbols; never mapped
pub const TEXT_BASE: Address = 0x0040_1000;

/// Distance between consecutive function symbols
pub const FUNCTION_STRIDE: Address = 0x10;

/// Unmapped bytes left between consecutive blocks
/// Runs off the end of a global land in the gap and fail to read
pub const GUARD_GAP: Address = 16;

/// Size of pointers and references
pub const POINTER_SIZE: usize = 8;

/// A member of a struct or union together with its byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSlot {
    pub name: String,
    pub ty: Type,
    pub offset: usize,
    pub is_base_class: bool,
}

/// Calculate the size of a type in bytes
///
/// Aggregates must have passed [`TypeDefs::check_layouts`]; a by-value cycle
/// would otherwise recurse forever.
pub fn sizeof_type(t: &Type, defs: &TypeDefs) -> usize {
    match t {
        Type::Void | Type::Function { .. } => 0,
        Type::Bool | Type::Char { .. } => 1,
        Type::Int { kind, .. } => match kind {
            IntKind::Short => 2,
            IntKind::Int => 4,
            IntKind::Long | IntKind::LongLong => 8,
        },
        Type::Float | Type::Enum(_) => 4,
        Type::Double | Type::Pointer(_) | Type::Reference(_) => POINTER_SIZE,
        Type::Array(elem, len) => len.unwrap_or(0) * sizeof_type(elem, defs),
        Type::Named(name) => defs
            .typedef(name)
            .map(|target| sizeof_type(target, defs))
            .unwrap_or(0),
        Type::Struct(tag) | Type::Union(tag) => compound_members(tag, defs)
            .iter()
            .map(|slot| slot.offset + sizeof_type(&slot.ty, defs))
            .max()
            .unwrap_or(0),
    }
}

/// Lay out the members of struct/union `tag`, base classes first
///
/// Incomplete and unknown tags have no members.
pub fn compound_members(tag: &str, defs: &TypeDefs) -> Vec<MemberSlot> {
    let Some(def) = defs.compound(tag) else {
        return Vec::new();
    };
    let Some(fields) = &def.fields else {
        return Vec::new();
    };

    let is_union = def.kind == CompoundKind::Union;
    let mut slots = Vec::with_capacity(def.bases.len() + fields.len());
    let mut offset = 0;

    let bases = def
        .bases
        .iter()
        .map(|base| (base.clone(), Type::Struct(base.clone()), true));
    let members = fields
        .iter()
        .map(|f| (f.name.clone(), f.field_type.clone(), false));

    for (name, ty, is_base_class) in bases.chain(members) {
        let size = sizeof_type(&ty, defs);
        slots.push(MemberSlot {
            name,
            ty,
            offset: if is_union { 0 } else { offset },
            is_base_class,
        });
        offset += size;
    }

    slots
}

/// Perform pointer arithmetic: addr + offset (scaled by pointee size)
pub fn pointer_add(addr: Address, offset: i64, pointee: &Type, defs: &TypeDefs) -> Address {
    let pointee_size = sizeof_type(pointee, defs).max(1) as i64;
    addr.wrapping_add_signed(offset.wrapping_mul(pointee_size))
}

/// Calculate the difference between two pointers (in elements, not bytes)
pub fn pointer_diff(a: Address, b: Address, pointee: &Type, defs: &TypeDefs) -> i64 {
    let pointee_size = sizeof_type(pointee, defs).max(1) as i64;
    (a as i64).wrapping_sub(b as i64) / pointee_size
}
