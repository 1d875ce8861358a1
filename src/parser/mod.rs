//! C declaration parser
//!
//! This module turns C source text into the small AST the program image is
//! built from, and parses the expressions and type names typed at the prompt:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, helpers and entry points
//! - [`ast`]: Types, declarations and expressions
//!
//! # Supported C Subset
//!
//! - Types: `void`, `_Bool`, `char`, `short`, `int`, `long`, `long long`
//!   (signed/unsigned), `float`, `double`, structs, unions, enums, typedefs,
//!   pointers, references, arrays, function prototypes
//! - Declarations: aggregate definitions (with C++-style base classes),
//!   forward declarations, typedefs, globals with initializers
//! - Expressions: see [`expressions`]
//! - No preprocessor (directives are skipped)
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser. No external parser generator
//! dependencies.

pub mod ast;
pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
