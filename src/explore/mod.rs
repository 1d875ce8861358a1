//! Interactive exploration engine
//!
//! The engine walks a value or a type one node at a time, printing a
//! description of the current node and prompting for the next step. Each
//! node is identified by an expression path (`(*list).items[2].name`) built
//! from the path of its parent.
//!
//! # Control protocol
//!
//! The dispatcher classifies a node into a [`Category`] and runs that
//! category's handler in a loop. Handlers answer with an [`Outcome`]:
//!
//! - `Repeat`: show this node again (a compound's menu, an array's prompt)
//! - `Return`: this node is done; control goes back to whichever handler
//!   recursed into the dispatcher
//!
//! Backing out to a parent is nothing more than a recursive call returning.
//! There is no stack of visited nodes.
//!
//! # Module Organization
//!
//! - [`host`]: traits through which the engine sees the inspected program
//! - [`dispatch`]: the [`Explorer`] and its Repeat/Return loop
//! - `scalar`, `pointer`, `reference`, `typedef`, `array`, `compound`:
//!   per-category handlers, implemented as `impl Explorer` blocks
//! - [`path`]: expression path construction
//! - [`category`]: type classification
//!
//! # Errors
//!
//! Host failures ([`InspectError`]) never escape the engine. They are
//! reported on the console and exploration carries on from the nearest node
//! that can still be shown.

pub mod category;
pub mod constants;
pub mod dispatch;
pub mod errors;
pub mod host;
pub mod path;

mod array;
mod compound;
mod pointer;
mod prompts;
mod reference;
mod scalar;
mod typedef;

pub use category::Category;
pub use dispatch::{Explorer, Outcome};
pub use errors::{ExploreError, InspectError};
pub use host::{Console, FieldDescriptor, Inspector, TypeCode, TypeHandle, ValueHandle};
