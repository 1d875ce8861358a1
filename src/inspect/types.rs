//! Type table and type handles
//!
//! [`TypeDefs`] holds every struct/union/enum definition and typedef of the
//! loaded image. [`TypeRef`] pairs an AST [`Type`] with the table so it can
//! answer the questions the explorer asks (fields, targets, typedef
//! stripping) without any further context.

use crate::explore::{FieldDescriptor, InspectError, TypeCode, TypeHandle};
use crate::memory::{compound_members, sizeof_type, MemberSlot};
use crate::parser::ast::{CompoundDef, Decl, EnumDef, Type};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::rc::Rc;

/// Longest typedef chain followed before giving up
pub const MAX_TYPEDEF_CHAIN: usize = 64;

/// Prefix marking compiler-synthesized vtable pointer fields
const ARTIFICIAL_FIELD_PREFIX: &str = "_vptr";

/// Struct, union, enum and typedef definitions of an image
#[derive(Debug, Clone, Default)]
pub struct TypeDefs {
    compounds: FxHashMap<String, CompoundDef>,
    enums: FxHashMap<String, EnumDef>,
    typedefs: FxHashMap<String, Type>,
    /// Enumerator name -> (enum tag, value)
    enumerators: FxHashMap<String, (String, i64)>,
}

impl TypeDefs {
    /// Record the type-level part of a declaration; variables and functions are ignored
    pub fn declare(&mut self, decl: Decl) -> Result<(), InspectError> {
        match decl {
            Decl::Compound(def) => self.add_compound(def),
            Decl::Enum(def) => self.add_enum(def),
            Decl::Typedef { name, target, .. } => self.add_typedef(name, target),
            Decl::Global { .. } | Decl::Function { .. } => Ok(()),
        }
    }

    pub fn add_compound(&mut self, def: CompoundDef) -> Result<(), InspectError> {
        match self.compounds.get(&def.name) {
            Some(existing) if existing.kind != def.kind => Err(InspectError::invalid(format!(
                "'{}' redeclared as a different kind of tag",
                def.name
            ))),
            Some(existing) if existing.fields.is_some() && def.fields.is_some() => Err(
                InspectError::invalid(format!("Redefinition of '{}'", def.name)),
            ),
            // A forward declaration never hides a definition
            Some(existing) if existing.fields.is_some() => Ok(()),
            _ => {
                self.compounds.insert(def.name.clone(), def);
                Ok(())
            }
        }
    }

    pub fn add_enum(&mut self, def: EnumDef) -> Result<(), InspectError> {
        if self.enums.contains_key(&def.name) {
            return Err(InspectError::invalid(format!(
                "Redefinition of 'enum {}'",
                def.name
            )));
        }
        for (variant, value) in &def.variants {
            if self
                .enumerators
                .insert(variant.clone(), (def.name.clone(), *value))
                .is_some()
            {
                return Err(InspectError::invalid(format!(
                    "Redefinition of enumerator '{}'",
                    variant
                )));
            }
        }
        self.enums.insert(def.name.clone(), def);
        Ok(())
    }

    pub fn add_typedef(&mut self, name: String, target: Type) -> Result<(), InspectError> {
        match self.typedefs.get(&name) {
            Some(existing) if *existing != target => Err(InspectError::invalid(format!(
                "Conflicting types for typedef '{}'",
                name
            ))),
            _ => {
                self.typedefs.insert(name, target);
                Ok(())
            }
        }
    }

    pub fn compound(&self, tag: &str) -> Option<&CompoundDef> {
        self.compounds.get(tag)
    }

    pub fn enum_def(&self, tag: &str) -> Option<&EnumDef> {
        self.enums.get(tag)
    }

    pub fn typedef(&self, name: &str) -> Option<&Type> {
        self.typedefs.get(name)
    }

    pub fn enumerator(&self, name: &str) -> Option<(&str, i64)> {
        self.enumerators
            .get(name)
            .map(|(tag, value)| (tag.as_str(), *value))
    }

    /// Name of the enumerator of `tag` with `value`, if there is one
    pub fn enumerator_name(&self, tag: &str, value: i64) -> Option<&str> {
        self.enums.get(tag).and_then(|def| {
            def.variants
                .iter()
                .find(|(_, v)| *v == value)
                .map(|(name, _)| name.as_str())
        })
    }

    pub fn typedef_names(&self) -> FxHashSet<String> {
        self.typedefs.keys().cloned().collect()
    }

    /// Follow typedefs until a non-typedef type is reached
    ///
    /// Gives up after [`MAX_TYPEDEF_CHAIN`] links and returns the typedef it
    /// stopped at; unknown typedef names are returned unchanged.
    pub fn strip_typedefs(&self, ty: &Type) -> Type {
        let mut current = ty;
        for _ in 0..MAX_TYPEDEF_CHAIN {
            match current {
                Type::Named(name) => match self.typedefs.get(name) {
                    Some(target) => current = target,
                    None => break,
                },
                _ => break,
            }
        }
        current.clone()
    }

    /// Check that every type mentioned by a definition exists and that no
    /// struct or union contains itself by value
    pub fn check_layouts(&self) -> Result<(), InspectError> {
        for name in self.compounds.keys() {
            self.check_compound(name, &mut Vec::new())?;
        }
        for target in self.typedefs.values() {
            self.check_type(target, &mut Vec::new())?;
        }
        Ok(())
    }

    /// Check that every typedef and enum `ty` mentions is declared
    pub fn check_declared(&self, ty: &Type) -> Result<(), InspectError> {
        self.check_type(ty, &mut Vec::new())
    }

    fn check_compound(&self, tag: &str, visiting: &mut Vec<String>) -> Result<(), InspectError> {
        if visiting.iter().any(|t| t == tag) {
            return Err(InspectError::invalid(format!(
                "'{}' contains itself",
                tag
            )));
        }
        let Some(def) = self.compounds.get(tag) else {
            return Ok(());
        };

        visiting.push(tag.to_string());
        for base in &def.bases {
            match self.compounds.get(base) {
                Some(base_def) if base_def.fields.is_some() => {
                    self.check_compound(base, visiting)?;
                }
                _ => {
                    return Err(InspectError::invalid(format!(
                        "Base class '{}' of '{}' has incomplete type",
                        base, tag
                    )))
                }
            }
        }
        for field in def.fields.iter().flatten() {
            self.check_type(&field.field_type, visiting)?;
        }
        visiting.pop();
        Ok(())
    }

    fn check_type(&self, ty: &Type, visiting: &mut Vec<String>) -> Result<(), InspectError> {
        match ty {
            Type::Struct(tag) | Type::Union(tag) => self.check_compound(tag, visiting),
            Type::Array(elem, _) => self.check_type(elem, visiting),
            Type::Named(name) => match self.typedefs.get(name) {
                Some(target) => self.check_type(target, visiting),
                None => Err(InspectError::UnknownType { name: name.clone() }),
            },
            Type::Enum(tag) if !self.enums.contains_key(tag) => Err(InspectError::UnknownType {
                name: format!("enum {}", tag),
            }),
            // Pointers and references break by-value cycles
            _ => Ok(()),
        }
    }
}

/// A type of the image, usable on its own
#[derive(Clone)]
pub struct TypeRef {
    defs: Rc<TypeDefs>,
    ty: Type,
}

impl TypeRef {
    pub fn new(defs: Rc<TypeDefs>, ty: Type) -> Self {
        TypeRef { defs, ty }
    }

    /// Another type sharing this one's table
    pub fn with(&self, ty: Type) -> TypeRef {
        TypeRef {
            defs: Rc::clone(&self.defs),
            ty,
        }
    }

    pub fn ast(&self) -> &Type {
        &self.ty
    }

    pub fn defs(&self) -> &TypeDefs {
        &self.defs
    }

    pub fn sizeof(&self) -> usize {
        sizeof_type(&self.ty, &self.defs)
    }

    /// The type with typedefs stripped, as an AST type
    pub fn resolved(&self) -> Type {
        self.defs.strip_typedefs(&self.ty)
    }

    /// Member layout of a struct/union type (typedefs stripped)
    pub fn members(&self) -> Vec<MemberSlot> {
        match self.resolved() {
            Type::Struct(tag) | Type::Union(tag) => compound_members(&tag, &self.defs),
            _ => Vec::new(),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty)
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.ty)
    }
}

impl TypeHandle for TypeRef {
    fn code(&self) -> TypeCode {
        match &self.ty {
            Type::Void => TypeCode::Void,
            Type::Bool => TypeCode::Bool,
            Type::Char { .. } => TypeCode::Char,
            Type::Int { .. } => TypeCode::Int,
            Type::Float | Type::Double => TypeCode::Float,
            Type::Enum(_) => TypeCode::Enum,
            Type::Struct(_) => TypeCode::Struct,
            Type::Union(_) => TypeCode::Union,
            Type::Named(_) => TypeCode::Typedef,
            Type::Pointer(_) => TypeCode::Ptr,
            Type::Reference(_) => TypeCode::Ref,
            Type::Array(..) => TypeCode::Array,
            Type::Function { .. } => TypeCode::Func,
        }
    }

    fn target(&self) -> Option<Self> {
        match &self.ty {
            Type::Pointer(inner) | Type::Reference(inner) | Type::Array(inner, _) => {
                Some(self.with(inner.as_ref().clone()))
            }
            Type::Function { ret, .. } => Some(self.with(ret.as_ref().clone())),
            Type::Named(name) => self.defs.typedef(name).map(|t| self.with(t.clone())),
            _ => None,
        }
    }

    fn fields(&self) -> Vec<FieldDescriptor<Self>> {
        if !matches!(self.ty, Type::Struct(_) | Type::Union(_)) {
            return Vec::new();
        }
        self.members()
            .into_iter()
            .map(|slot| FieldDescriptor {
                is_artificial: !slot.is_base_class
                    && slot.name.starts_with(ARTIFICIAL_FIELD_PREFIX),
                is_base_class: slot.is_base_class,
                ty: self.with(slot.ty),
                name: slot.name,
            })
            .collect()
    }

    fn strip_typedefs(&self) -> Self {
        self.with(self.resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::Parser;

    fn defs(source: &str) -> Rc<TypeDefs> {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let mut defs = TypeDefs::default();
        for decl in program.decls {
            defs.declare(decl).unwrap();
        }
        defs.check_layouts().unwrap();
        Rc::new(defs)
    }

    #[test]
    fn test_codes() {
        let defs = defs("typedef struct node { struct node *next; } Node;");
        let node = TypeRef::new(defs.clone(), Type::Named("Node".to_string()));
        assert_eq!(node.code(), TypeCode::Typedef);
        assert_eq!(node.strip_typedefs().code(), TypeCode::Struct);
        assert_eq!(node.strip_typedefs().to_string(), "struct node");
        assert_eq!(
            TypeRef::new(defs, Type::Float).code(),
            TypeCode::Float
        );
    }

    #[test]
    fn test_cyclic_struct_fields() {
        let defs = defs("struct node { int value; struct node *next; };");
        let node = TypeRef::new(defs, Type::Struct("node".to_string()));
        let fields = node.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].ty.to_string(), "struct node *");
        let pointee = fields[1].ty.target().unwrap();
        assert_eq!(pointee, node);
        assert_eq!(pointee.fields().len(), 2);
    }

    #[test]
    fn test_vptr_fields_are_artificial() {
        let defs = defs("struct shape { void **_vptr_shape; int sides; };");
        let shape = TypeRef::new(defs, Type::Struct("shape".to_string()));
        let fields = shape.fields();
        assert!(fields[0].is_artificial);
        assert!(!fields[1].is_artificial);
    }

    #[test]
    fn test_base_class_pseudo_fields() {
        let defs = defs("struct base { int id; }; struct derived : base { int extra; };");
        let derived = TypeRef::new(defs, Type::Struct("derived".to_string()));
        let fields = derived.fields();
        assert_eq!(fields[0].name, "base");
        assert!(fields[0].is_base_class);
        assert_eq!(fields[0].ty.to_string(), "struct base");
    }

    #[test]
    fn test_struct_containing_itself_is_rejected() {
        let program = Parser::new("struct loop { int x; struct loop inner; };")
            .unwrap()
            .parse_program()
            .unwrap();
        let mut defs = TypeDefs::default();
        for decl in program.decls {
            defs.declare(decl).unwrap();
        }
        assert!(defs.check_layouts().is_err());
    }

    #[test]
    fn test_conflicting_typedef_is_rejected() {
        let mut defs = TypeDefs::default();
        defs.add_typedef("T".to_string(), Type::int()).unwrap();
        defs.add_typedef("T".to_string(), Type::int()).unwrap();
        assert!(defs.add_typedef("T".to_string(), Type::char()).is_err());
    }
}
