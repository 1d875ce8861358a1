//! Building a program image from a C declaration file
//!
//! Loading happens in three passes:
//! 1. Type definitions are collected and their layouts checked
//! 2. Every global is given an address, so initializers may refer to any
//!    global regardless of declaration order
//! 3. Initializers are evaluated and written into memory

use super::types::TypeDefs;
use super::{FunctionSymbol, GlobalSymbol, InspectError, ProgramImage};
use crate::memory::space::AddressSpace;
use crate::memory::value::{Address, Scalar, ScalarKind};
use crate::memory::{compound_members, sizeof_type, FUNCTION_STRIDE, TEXT_BASE};
use crate::parser::ast::{Decl, Expr, Initializer, Type};
use crate::parser::parse::Parser;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Give an unsized outermost array the length its initializer implies
fn complete_array_type(ty: Type, init: Option<&Initializer>) -> Type {
    match (ty, init) {
        (Type::Array(elem, None), Some(Initializer::List(items, _))) => {
            Type::Array(elem, Some(items.len()))
        }
        (Type::Array(elem, None), Some(Initializer::Expr(Expr::StringLiteral(s, _)))) => {
            Type::Array(elem, Some(s.len() + 1))
        }
        (ty, _) => ty,
    }
}

impl ProgramImage {
    /// Load an image from the text of a C declaration file
    pub fn load(source: &str) -> Result<ProgramImage, InspectError> {
        let program = Parser::new(source)?.parse_program()?;

        let mut defs = TypeDefs::default();
        let mut variables = Vec::new();
        let mut functions = FxHashMap::default();
        let mut next_function = TEXT_BASE;

        for decl in program.decls {
            match decl {
                Decl::Global {
                    name,
                    var_type,
                    init,
                    ..
                } => variables.push((name, var_type, init)),
                Decl::Function {
                    name, func_type, ..
                } => {
                    functions.entry(name).or_insert_with(|| {
                        let address = next_function;
                        next_function += FUNCTION_STRIDE;
                        FunctionSymbol {
                            ty: func_type,
                            address,
                        }
                    });
                }
                other => defs.declare(other)?,
            }
        }
        defs.check_layouts()?;

        let mut memory = AddressSpace::new();
        let mut globals = FxHashMap::default();
        let mut initializers = Vec::new();

        for (name, var_type, init) in variables {
            if globals.contains_key(&name) || functions.contains_key(&name) {
                return Err(InspectError::invalid(format!(
                    "Redefinition of '{}'",
                    name
                )));
            }

            let ty = complete_array_type(var_type, init.as_ref());
            defs.check_declared(&ty)?;
            if matches!(ty, Type::Reference(_)) && init.is_none() {
                return Err(InspectError::invalid(format!(
                    "'{}' declared as reference but not initialized",
                    name
                )));
            }

            let size = sizeof_type(&ty, &defs);
            let address = memory.allocate_global(&name, size);
            debug!(name = %name, address, size, "allocated global");

            if let Some(init) = init {
                initializers.push((name.clone(), init));
            }
            globals.insert(name, GlobalSymbol { ty, address });
        }

        let image = ProgramImage::from_parts(defs, memory, globals, functions);

        for (name, init) in &initializers {
            image.initialize_global(name, init).map_err(|err| {
                InspectError::invalid(format!("In initializer of '{}': {}", name, err))
            })?;
        }

        info!(
            globals = image.inner.globals.len(),
            functions = image.inner.functions.len(),
            "image loaded"
        );
        Ok(image)
    }

    fn initialize_global(&self, name: &str, init: &Initializer) -> Result<(), InspectError> {
        let Some(global) = self.global(name) else {
            return Err(InspectError::NoSymbol {
                name: name.to_string(),
            });
        };
        let (address, ty) = (global.address, global.ty.clone());
        self.initialize(address, &ty, init)
    }

    fn initialize(&self, address: Address, ty: &Type, init: &Initializer) -> Result<(), InspectError> {
        let defs = self.defs();
        let resolved = defs.strip_typedefs(ty);

        match (init, &resolved) {
            (Initializer::List(items, _), Type::Array(elem, len)) => {
                if len.is_some_and(|len| items.len() > len) {
                    return Err(InspectError::invalid(
                        "Excess elements in array initializer",
                    ));
                }
                let stride = sizeof_type(elem, defs) as u64;
                for (i, item) in items.iter().enumerate() {
                    self.initialize(address + i as u64 * stride, elem, item)?;
                }
                Ok(())
            }
            (Initializer::List(items, _), Type::Struct(tag) | Type::Union(tag)) => {
                let mut slots = compound_members(tag, defs);
                if matches!(resolved, Type::Union(_)) {
                    slots.truncate(1);
                }
                if items.len() > slots.len() {
                    return Err(InspectError::invalid(format!(
                        "Excess elements in initializer of '{}'",
                        resolved
                    )));
                }
                for (slot, item) in slots.iter().zip(items) {
                    self.initialize(address + slot.offset as u64, &slot.ty, item)?;
                }
                Ok(())
            }
            (Initializer::List(items, _), _) => match items.as_slice() {
                [] => Ok(()),
                [single] => self.initialize(address, ty, single),
                _ => Err(InspectError::invalid(
                    "Excess elements in scalar initializer",
                )),
            },
            (Initializer::Expr(expr), Type::Reference(_)) => {
                let referent = self.eval_expr(expr)?;
                let target = referent.address().ok_or_else(|| {
                    InspectError::invalid("Cannot bind a reference to a value not in memory")
                })?;
                self.write_memory(address, &Scalar::Pointer(target).encode(ScalarKind::Pointer))
            }
            (Initializer::Expr(expr), _) => {
                let value = self.eval_expr(expr)?;
                let bytes = self.coerce(&value, ty)?;
                self.write_memory(address, &bytes)
            }
        }
    }
}
