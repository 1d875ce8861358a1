// AST definitions for the C declaration subset understood by the loader

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Width of an integer type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    Short,
    Int,
    Long,
    LongLong,
}

/// Prefix used for the tags of anonymous structs, unions and enums
pub const ANONYMOUS_TAG_PREFIX: &str = "{...}#";

/// Type representation
///
/// Named aggregates (`Struct`, `Union`, `Enum`) and typedefs (`Named`) refer to
/// their definitions by name, so self-referential declarations such as
/// `struct node { struct node *next; }` need no cycles in the tree itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Void,
    Bool,
    Char { signed: bool },
    Int { kind: IntKind, signed: bool },
    Float,
    Double,
    Enum(String),
    Struct(String),
    Union(String),
    Named(String), // typedef name
    Pointer(Box<Type>),
    Reference(Box<Type>),
    Array(Box<Type>, Option<usize>), // None for unsized arrays
    Function { ret: Box<Type>, params: Vec<Type> },
}

impl Type {
    pub fn int() -> Self {
        Type::Int {
            kind: IntKind::Int,
            signed: true,
        }
    }

    pub fn long() -> Self {
        Type::Int {
            kind: IntKind::Long,
            signed: true,
        }
    }

    pub fn char() -> Self {
        Type::Char { signed: true }
    }

    pub fn pointer_to(self) -> Self {
        Type::Pointer(Box::new(self))
    }

    pub fn reference_to(self) -> Self {
        Type::Reference(Box::new(self))
    }

    pub fn array_of(self, len: Option<usize>) -> Self {
        Type::Array(Box::new(self), len)
    }

    /// Base specifier name, without any declarator decoration
    fn specifier(&self) -> String {
        match self {
            Type::Void => "void".to_string(),
            Type::Bool => "_Bool".to_string(),
            Type::Char { signed: true } => "char".to_string(),
            Type::Char { signed: false } => "unsigned char".to_string(),
            Type::Int { kind, signed } => {
                let base = match kind {
                    IntKind::Short => "short",
                    IntKind::Int => "int",
                    IntKind::Long => "long",
                    IntKind::LongLong => "long long",
                };
                if *signed {
                    base.to_string()
                } else {
                    format!("unsigned {}", base)
                }
            }
            Type::Float => "float".to_string(),
            Type::Double => "double".to_string(),
            Type::Enum(tag) => tagged("enum", tag),
            Type::Struct(tag) => tagged("struct", tag),
            Type::Union(tag) => tagged("union", tag),
            Type::Named(name) => name.clone(),
            Type::Pointer(inner)
            | Type::Reference(inner)
            | Type::Array(inner, _)
            | Type::Function { ret: inner, .. } => inner.specifier(),
        }
    }

    /// Build the C declarator text around `inner` (e.g. `*`, `(*)[3]`)
    fn declarator(&self, inner: String) -> String {
        match self {
            Type::Pointer(target) | Type::Reference(target) => {
                let sigil = if matches!(self, Type::Pointer(_)) { "*" } else { "&" };
                let wrapped = format!("{}{}", sigil, inner);
                match target.as_ref() {
                    Type::Array(..) | Type::Function { .. } => {
                        target.declarator(format!("({})", wrapped))
                    }
                    _ => target.declarator(wrapped),
                }
            }
            Type::Array(elem, len) => {
                let dim = match len {
                    Some(n) => format!("[{}]", n),
                    None => "[]".to_string(),
                };
                elem.declarator(format!("{}{}", inner, dim))
            }
            Type::Function { ret, params } => {
                let params = if params.is_empty() {
                    "void".to_string()
                } else {
                    params
                        .iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                ret.declarator(format!("{}({})", inner, params))
            }
            _ => inner,
        }
    }
}

fn tagged(keyword: &str, tag: &str) -> String {
    if tag.starts_with(ANONYMOUS_TAG_PREFIX) {
        format!("{} {{...}}", keyword)
    } else {
        format!("{} {}", keyword, tag)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declarator = self.declarator(String::new());
        if declarator.is_empty() {
            write!(f, "{}", self.specifier())
        } else {
            write!(f, "{} {}", self.specifier(), declarator)
        }
    }
}

/// Struct or union member
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub field_type: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundKind {
    Struct,
    Union,
}

/// Struct or union definition
///
/// `fields` is `None` for a forward declaration (`struct opaque;`).
#[derive(Debug, Clone)]
pub struct CompoundDef {
    pub kind: CompoundKind,
    pub name: String,
    pub bases: Vec<String>,
    pub fields: Option<Vec<Field>>,
    pub location: SourceLocation,
}

/// Enum definition with resolved enumerator values
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<(String, i64)>,
    pub location: SourceLocation,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Deref,  // *x
    AddrOf, // &x
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
}

/// Expressions accepted at the prompt and in initializers
#[derive(Debug, Clone)]
pub enum Expr {
    IntLiteral(i64, SourceLocation),
    CharLiteral(i8, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),
    BoolLiteral(bool, SourceLocation),
    Null {
        location: SourceLocation,
    },
    Ident(String, SourceLocation),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        member: String,
        location: SourceLocation,
    },
    PointerMember {
        object: Box<Expr>,
        member: String,
        location: SourceLocation,
    },
    Cast {
        target_type: Type,
        expr: Box<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::IntLiteral(_, loc)
            | Expr::CharLiteral(_, loc)
            | Expr::FloatLiteral(_, loc)
            | Expr::StringLiteral(_, loc)
            | Expr::BoolLiteral(_, loc)
            | Expr::Ident(_, loc) => *loc,
            Expr::Null { location }
            | Expr::Unary { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Index { location, .. }
            | Expr::Member { location, .. }
            | Expr::PointerMember { location, .. }
            | Expr::Cast { location, .. } => *location,
        }
    }
}

/// Global variable initializer
#[derive(Debug, Clone)]
pub enum Initializer {
    Expr(Expr),
    List(Vec<Initializer>, SourceLocation),
}

/// Top-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Compound(CompoundDef),
    Enum(EnumDef),
    Typedef {
        name: String,
        target: Type,
        location: SourceLocation,
    },
    Global {
        name: String,
        var_type: Type,
        init: Option<Initializer>,
        location: SourceLocation,
    },
    Function {
        name: String,
        func_type: Type,
        location: SourceLocation,
    },
}

/// Parsed declaration file
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
