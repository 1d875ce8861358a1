//! Value handles over the program image
//!
//! An [`ImageValue`] is a type plus a [`Place`]: either an address in the
//! image's memory (an lvalue) or an immediate byte buffer (the result of
//! arithmetic, casts and literals). Nothing is read when a handle is made;
//! bytes are fetched each time the value is rendered, so a handle always
//! shows the current contents of memory.

use super::render::render_value;
use super::types::TypeRef;
use super::ProgramImage;
use crate::explore::{FieldDescriptor, InspectError, ValueHandle};
use crate::memory::value::{Address, Scalar, ScalarKind};
use crate::memory::{compound_members, pointer_add, sizeof_type};
use crate::parser::ast::{IntKind, Type};
use std::rc::Rc;

/// Where the bytes of a value live
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Memory(Address),
    Immediate(Rc<[u8]>),
}

/// A value of the image
#[derive(Debug, Clone)]
pub struct ImageValue {
    image: ProgramImage,
    ty: TypeRef,
    place: Place,
}

/// How a scalar type's bytes are interpreted; `None` for aggregates
pub(crate) fn scalar_kind(ty: &Type) -> Option<ScalarKind> {
    match ty {
        Type::Bool => Some(ScalarKind::Unsigned(1)),
        Type::Char { signed: true } => Some(ScalarKind::Signed(1)),
        Type::Char { signed: false } => Some(ScalarKind::Unsigned(1)),
        Type::Int { kind, signed } => {
            let size = match kind {
                IntKind::Short => 2,
                IntKind::Int => 4,
                IntKind::Long | IntKind::LongLong => 8,
            };
            Some(if *signed {
                ScalarKind::Signed(size)
            } else {
                ScalarKind::Unsigned(size)
            })
        }
        Type::Enum(_) => Some(ScalarKind::Signed(4)),
        Type::Float => Some(ScalarKind::Float32),
        Type::Double => Some(ScalarKind::Float64),
        Type::Pointer(_) | Type::Reference(_) => Some(ScalarKind::Pointer),
        _ => None,
    }
}

fn non_pointer() -> InspectError {
    InspectError::invalid("Attempt to take contents of a non-pointer value.")
}

fn not_in_memory() -> InspectError {
    InspectError::invalid("Attempt to take address of value not located in memory.")
}

/// Byte offset of base class `base` within struct `derived`, searching
/// indirect bases depth-first
fn base_offset(image: &ProgramImage, derived: &str, base: &str) -> Option<usize> {
    compound_members(derived, image.defs())
        .into_iter()
        .filter(|slot| slot.is_base_class)
        .find_map(|slot| {
            if slot.name == base {
                Some(slot.offset)
            } else {
                base_offset(image, &slot.name, base).map(|inner| slot.offset + inner)
            }
        })
}

impl ImageValue {
    pub(crate) fn new(image: &ProgramImage, ty: Type, place: Place) -> Self {
        ImageValue {
            ty: image.type_ref(ty),
            image: image.clone(),
            place,
        }
    }

    /// An lvalue of type `ty` at `address`
    pub fn at(image: &ProgramImage, ty: Type, address: Address) -> Self {
        Self::new(image, ty, Place::Memory(address))
    }

    pub fn immediate(image: &ProgramImage, ty: Type, bytes: Vec<u8>) -> Self {
        Self::new(image, ty, Place::Immediate(bytes.into()))
    }

    /// An rvalue of scalar type `ty` holding `scalar`
    pub fn from_scalar(image: &ProgramImage, ty: Type, scalar: Scalar) -> Result<Self, InspectError> {
        let resolved = image.defs().strip_typedefs(&ty);
        let kind = scalar_kind(&resolved)
            .ok_or_else(|| InspectError::invalid(format!("'{}' is not a scalar type", ty)))?;
        let bytes = match resolved {
            Type::Bool => Scalar::Int(i64::from(!scalar.is_zero())).encode(kind),
            _ => scalar.encode(kind),
        };
        Ok(Self::immediate(image, ty, bytes))
    }

    pub fn image(&self) -> &ProgramImage {
        &self.image
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    pub fn place(&self) -> &Place {
        &self.place
    }

    pub fn address(&self) -> Option<Address> {
        match self.place {
            Place::Memory(addr) => Some(addr),
            Place::Immediate(_) => None,
        }
    }

    pub fn size(&self) -> usize {
        self.ty.sizeof()
    }

    fn with_type(&self, ty: Type) -> Self {
        ImageValue {
            ty: self.ty.with(ty),
            image: self.image.clone(),
            place: self.place.clone(),
        }
    }

    /// Current bytes of the value
    pub fn bytes(&self) -> Result<Vec<u8>, InspectError> {
        match &self.place {
            Place::Memory(addr) => self.image.read_memory(*addr, self.size()),
            Place::Immediate(bytes) => Ok(bytes.to_vec()),
        }
    }

    /// Decode the value as a scalar
    pub fn scalar(&self) -> Result<Scalar, InspectError> {
        let resolved = self.ty.resolved();
        let kind = scalar_kind(&resolved).ok_or_else(|| {
            InspectError::invalid(format!("Value of type '{}' is not a scalar", self.ty))
        })?;
        Ok(Scalar::decode(&self.bytes()?, kind))
    }

    /// The part of this value `offset` bytes in, viewed as `ty`
    fn slice(&self, offset: usize, ty: Type) -> Result<Self, InspectError> {
        match &self.place {
            Place::Memory(addr) => {
                let addr = addr
                    .checked_add(offset as u64)
                    .ok_or(InspectError::UnreadableMemory { address: *addr })?;
                Ok(ImageValue::at(&self.image, ty, addr))
            }
            Place::Immediate(bytes) => {
                let size = sizeof_type(&ty, self.image.defs());
                let part = bytes
                    .get(offset..offset + size)
                    .ok_or_else(|| InspectError::invalid("no such vector element"))?;
                Ok(ImageValue::immediate(&self.image, ty, part.to_vec()))
            }
        }
    }

    /// `&value`
    pub fn address_of(&self) -> Result<Self, InspectError> {
        let addr = self.address().ok_or_else(not_in_memory)?;
        ImageValue::from_scalar(
            &self.image,
            self.ty.ast().clone().pointer_to(),
            Scalar::Pointer(addr),
        )
    }

    /// `value.name`, looking through base classes
    pub fn member(&self, name: &str) -> Result<Self, InspectError> {
        let tag = match self.ty.resolved() {
            Type::Struct(tag) | Type::Union(tag) => tag,
            Type::Reference(_) => return self.referenced_value()?.member(name),
            _ => {
                return Err(InspectError::invalid(
                    "Attempt to extract a component of a value that is not a structure.",
                ))
            }
        };

        let slots = compound_members(&tag, self.image.defs());
        if let Some(slot) = slots.iter().find(|s| !s.is_base_class && s.name == name) {
            return self.slice(slot.offset, slot.ty.clone());
        }
        for slot in slots.iter().filter(|s| s.is_base_class) {
            let base = self.slice(slot.offset, slot.ty.clone())?;
            if let Ok(found) = base.member(name) {
                return Ok(found);
            }
        }

        Err(InspectError::invalid(format!(
            "There is no member named {}.",
            name
        )))
    }

    /// Convert to `target` the way a C cast does
    pub fn cast(&self, target: Type) -> Result<Self, InspectError> {
        let defs = self.image.defs();
        let from = self.ty.resolved();
        let to = defs.strip_typedefs(&target);

        if from == to {
            return Ok(self.with_type(target));
        }

        match (&from, &to) {
            (Type::Struct(derived), Type::Struct(base)) => {
                let offset = base_offset(&self.image, derived, base)
                    .ok_or_else(|| InspectError::invalid("Invalid cast."))?;
                self.slice(offset, target)
            }
            (_, Type::Void) => Ok(ImageValue::immediate(&self.image, target, Vec::new())),
            (Type::Array(..), Type::Pointer(_)) | (Type::Function { .. }, Type::Pointer(_)) => {
                let addr = self.address().ok_or_else(not_in_memory)?;
                ImageValue::from_scalar(&self.image, target, Scalar::Pointer(addr))
            }
            _ if scalar_kind(&from).is_some() && scalar_kind(&to).is_some() => {
                ImageValue::from_scalar(&self.image, target, self.scalar()?)
            }
            _ => Err(InspectError::invalid("Invalid cast.")),
        }
    }

    /// Write `bytes` over this value
    pub(crate) fn store(&self, bytes: &[u8]) -> Result<(), InspectError> {
        match self.place {
            Place::Memory(addr) => self.image.write_memory(addr, bytes),
            Place::Immediate(_) => Err(InspectError::invalid(
                "Left operand of assignment is not an lvalue.",
            )),
        }
    }
}

impl ValueHandle for ImageValue {
    type Type = TypeRef;

    fn ty(&self) -> TypeRef {
        self.ty.clone()
    }

    fn render(&self) -> Result<String, InspectError> {
        render_value(self)
    }

    fn fetch(&self) -> Result<(), InspectError> {
        match (&self.place, self.ty.resolved()) {
            // Function symbols have an address but no readable contents
            (_, Type::Function { .. }) | (Place::Immediate(_), _) => Ok(()),
            (Place::Memory(addr), _) => self.image.check_readable(*addr, self.size()),
        }
    }

    fn dereference(&self) -> Result<Self, InspectError> {
        match self.ty.resolved() {
            Type::Pointer(target) => {
                let target_resolved = self.image.defs().strip_typedefs(&target);
                if target_resolved == Type::Void {
                    return Err(non_pointer());
                }
                let addr = self.scalar()?.as_bits();
                let value = ImageValue::at(&self.image, *target, addr);
                if !matches!(target_resolved, Type::Function { .. }) {
                    self.image.check_readable(addr, value.size())?;
                }
                Ok(value)
            }
            Type::Array(..) => self.index(0),
            Type::Function { .. } => Ok(self.clone()),
            _ => Err(non_pointer()),
        }
    }

    fn referenced_value(&self) -> Result<Self, InspectError> {
        match self.ty.resolved() {
            Type::Reference(target) => {
                let addr = self.scalar()?.as_bits();
                Ok(ImageValue::at(&self.image, *target, addr))
            }
            _ => Err(InspectError::invalid(format!(
                "Value of type '{}' is not a reference",
                self.ty
            ))),
        }
    }

    fn index(&self, index: i64) -> Result<Self, InspectError> {
        let defs = self.image.defs();
        match self.ty.resolved() {
            Type::Pointer(target) => {
                let base = self.scalar()?.as_bits();
                let addr = pointer_add(base, index, &target, defs);
                Ok(ImageValue::at(&self.image, *target, addr))
            }
            Type::Array(elem, len) => match self.place {
                Place::Memory(base) => {
                    let addr = pointer_add(base, index, &elem, defs);
                    Ok(ImageValue::at(&self.image, *elem, addr))
                }
                Place::Immediate(_) => {
                    if index < 0 || len.map_or(true, |len| index as usize >= len) {
                        return Err(InspectError::invalid("no such vector element"));
                    }
                    let offset = index as usize * sizeof_type(&elem, defs);
                    self.slice(offset, *elem)
                }
            },
            _ => Err(InspectError::invalid(format!(
                "cannot subscript something of type `{}'",
                self.ty
            ))),
        }
    }

    fn cast_to(&self, ty: &TypeRef) -> Result<Self, InspectError> {
        self.cast(ty.ast().clone())
    }

    fn field_value(&self, field: &FieldDescriptor<TypeRef>) -> Result<Self, InspectError> {
        if field.is_base_class {
            self.cast_to(&field.ty)
        } else {
            self.member(&field.name)
        }
    }
}
