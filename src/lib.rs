//! # Introduction
//!
//! cexplore loads a C program image (type declarations plus initialized
//! global variables) and lets you walk its values and types interactively,
//! one menu choice at a time: drill into struct and union fields, follow
//! pointers and references, index arrays and unwrap typedefs, then back out
//! to the enclosing node at any depth.
//!
//! ## Pipeline
//!
//! ```text
//! Declarations → Lexer → Parser → AST → Loader → ProgramImage → Explorer
//! ```
//!
//! 1. [`parser`]: tokenises declaration files, prompt expressions and type
//!    names and builds an AST.
//! 2. [`inspect`]: the [`inspect::ProgramImage`]: type table, globals laid out
//!    in a sparse [`memory::space::AddressSpace`], expression evaluation and
//!    value rendering.
//! 3. [`explore`]: the exploration engine. It only sees the image through the
//!    [`explore::Inspector`], [`explore::ValueHandle`] and
//!    [`explore::TypeHandle`] traits, and talks to the user through an
//!    [`explore::Console`].
//! 4. [`commands`]: `explore`, `explore value`, `explore type` and the REPL
//!    commands around them.
//! 5. [`console`]: the terminal console and a scripted console for tests.
//!
//! ## Supported declarations
//!
//! Types: `char`, `short`, `int`, `long`, `long long` (signed and unsigned),
//! `_Bool`, `float`, `double`, enums, structs and unions (with base classes),
//! typedefs, pointers, references, arrays and function prototypes.
//! Globals may carry initializers: constants, string literals, addresses of
//! other globals, casts and brace lists.

pub mod commands;
pub mod console;
pub mod explore;
pub mod inspect;
pub mod memory;
pub mod parser;
