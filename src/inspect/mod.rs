//! Program image: the inspected program the explorer runs against
//!
//! A [`ProgramImage`] is built from a C declaration file. It owns:
//! - a [`TypeDefs`] table of struct/union/enum/typedef definitions
//! - an [`AddressSpace`] holding every global variable and string literal
//! - symbol tables for globals and function prototypes
//!
//! # Module Organization
//!
//! - [`types`]: type table and [`TypeRef`] handles
//! - [`value`]: [`ImageValue`] handles over the address space
//! - `eval`: expression evaluation and `set var` assignment
//! - `loader`: building an image from declarations
//! - `render`: display text of values
//!
//! The image is a cheap reference-counted handle; values and types handed
//! to the explorer keep it alive. Memory sits behind a `RefCell` so that the
//! REPL (or a test) can write to it between prompts while handles are alive.

pub mod types;
pub mod value;

mod eval;
mod loader;
mod render;

pub use crate::explore::InspectError;
pub use types::{TypeDefs, TypeRef};
pub use value::{ImageValue, Place};

use crate::explore::Inspector;
use crate::memory::space::AddressSpace;
use crate::memory::value::Address;
use crate::parser::ast::Type;
use crate::parser::parse::Parser;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// A global variable of the image
#[derive(Debug, Clone)]
pub struct GlobalSymbol {
    pub ty: Type,
    pub address: Address,
}

/// A function prototype; its address is never readable memory
#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub ty: Type,
    pub address: Address,
}

#[derive(Debug)]
struct ImageData {
    defs: Rc<TypeDefs>,
    memory: RefCell<AddressSpace>,
    globals: FxHashMap<String, GlobalSymbol>,
    functions: FxHashMap<String, FunctionSymbol>,
    function_names: FxHashMap<Address, String>,
}

/// Loaded program image
#[derive(Debug, Clone)]
pub struct ProgramImage {
    inner: Rc<ImageData>,
}

impl ProgramImage {
    fn from_parts(
        defs: TypeDefs,
        memory: AddressSpace,
        globals: FxHashMap<String, GlobalSymbol>,
        functions: FxHashMap<String, FunctionSymbol>,
    ) -> Self {
        let function_names = functions
            .iter()
            .map(|(name, symbol)| (symbol.address, name.clone()))
            .collect();
        ProgramImage {
            inner: Rc::new(ImageData {
                defs: Rc::new(defs),
                memory: RefCell::new(memory),
                globals,
                functions,
                function_names,
            }),
        }
    }

    pub fn defs(&self) -> &Rc<TypeDefs> {
        &self.inner.defs
    }

    /// A type handle over this image's type table
    pub fn type_ref(&self, ty: Type) -> TypeRef {
        TypeRef::new(Rc::clone(&self.inner.defs), ty)
    }

    pub fn global(&self, name: &str) -> Option<&GlobalSymbol> {
        self.inner.globals.get(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSymbol> {
        self.inner.functions.get(name)
    }

    /// Name of the function symbol at `addr`
    pub fn function_at(&self, addr: Address) -> Option<&str> {
        self.inner.function_names.get(&addr).map(String::as_str)
    }

    /// Names of all globals, sorted
    pub fn global_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.globals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn read_memory(&self, addr: Address, size: usize) -> Result<Vec<u8>, InspectError> {
        self.inner.memory.borrow().read(addr, size)
    }

    pub fn check_readable(&self, addr: Address, size: usize) -> Result<(), InspectError> {
        self.inner.memory.borrow().check_readable(addr, size)
    }

    pub fn write_memory(&self, addr: Address, bytes: &[u8]) -> Result<(), InspectError> {
        self.inner.memory.borrow_mut().write(addr, bytes)
    }

    /// Parser seeded with this image's typedef names
    fn parser(&self, text: &str) -> Result<Parser, InspectError> {
        Ok(Parser::with_typedefs(text, self.inner.defs.typedef_names())?)
    }

    /// Resolve a type name such as `struct node *` or `Node [3]`
    pub fn resolve_type(&self, text: &str) -> Result<TypeRef, InspectError> {
        let unknown = || InspectError::UnknownType {
            name: text.trim().to_string(),
        };
        let ty = self
            .parser(text)
            .and_then(|mut parser| Ok(parser.parse_standalone_type_name()?))
            .map_err(|_| unknown())?;
        if !self.is_known(&ty) {
            return Err(unknown());
        }
        Ok(self.type_ref(ty))
    }

    /// Whether every tag `ty` mentions is declared
    fn is_known(&self, ty: &Type) -> bool {
        let defs = &self.inner.defs;
        match ty {
            Type::Struct(tag) | Type::Union(tag) => defs.compound(tag).is_some(),
            Type::Enum(tag) => defs.enum_def(tag).is_some(),
            Type::Named(name) => defs.typedef(name).is_some(),
            Type::Pointer(inner) | Type::Reference(inner) | Type::Array(inner, _) => {
                self.is_known(inner)
            }
            Type::Function { ret, params } => {
                self.is_known(ret) && params.iter().all(|p| self.is_known(p))
            }
            _ => true,
        }
    }
}

impl Inspector for ProgramImage {
    type Value = ImageValue;

    fn evaluate_expression(&self, text: &str) -> Result<ImageValue, InspectError> {
        self.evaluate(text)
    }

    fn resolve_type_name(&self, text: &str) -> Result<TypeRef, InspectError> {
        self.resolve_type(text)
    }
}
