//! Category dispatch and the Repeat/Return loop

use super::category::Category;
use super::constants::MAX_EXPLORE_DEPTH;
use super::host::{Console, TypeHandle, ValueHandle};
use tracing::{debug, warn};

/// What a handler wants done with the node it just showed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Show the same node again
    Repeat,
    /// The node is finished; unwind to the caller
    Return,
}

/// Drives one exploration session over a console
pub struct Explorer<'c, C: Console> {
    pub(crate) console: &'c mut C,
    depth: usize,
}

impl<'c, C: Console> Explorer<'c, C> {
    pub fn new(console: &'c mut C) -> Self {
        Explorer { console, depth: 0 }
    }

    /// Number of dispatches currently on the call stack
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Explore `value`, known to the user as `path`
    ///
    /// Runs the handler for the value's category until it answers
    /// [`Outcome::Return`]. `is_child` is false only for the node a command
    /// started from.
    pub fn explore_value<V: ValueHandle>(&mut self, path: &str, value: &V, is_child: bool) {
        if !self.enter(path) {
            return;
        }

        let ty = value.ty();
        let category = ty.category();
        debug!(path, ?category, depth = self.depth, "exploring value");

        loop {
            let outcome = match category {
                Category::Scalar => self.explore_scalar_value(path, value, is_child),
                Category::Struct | Category::Union => {
                    self.explore_compound_value(path, value, is_child)
                }
                Category::Pointer => self.explore_pointer_value(path, value, is_child),
                Category::Reference => self.explore_reference_value(path, value, is_child),
                Category::Typedef => self.explore_typedef_value(path, value, is_child),
                Category::Array => self.explore_array_value(path, value, is_child),
                Category::Unsupported => self.report_unsupported(&ty),
            };
            if outcome == Outcome::Return {
                break;
            }
        }

        self.depth -= 1;
    }

    /// Explore type `ty`, known to the user as `name`
    pub fn explore_type<T: TypeHandle>(&mut self, name: &str, ty: &T, is_child: bool) {
        if !self.enter(name) {
            return;
        }

        let category = ty.category();
        debug!(name, ?category, depth = self.depth, "exploring type");

        loop {
            let outcome = match category {
                Category::Scalar => self.explore_scalar_type(name, ty, is_child),
                Category::Struct | Category::Union => {
                    self.explore_compound_type(name, ty, is_child)
                }
                Category::Pointer => self.explore_pointer_type(name, ty, is_child),
                Category::Reference => self.explore_reference_type(name, ty, is_child),
                Category::Typedef => self.explore_typedef_type(name, ty, is_child),
                Category::Array => self.explore_array_type(name, ty, is_child),
                Category::Unsupported => self.report_unsupported(ty),
            };
            if outcome == Outcome::Return {
                break;
            }
        }

        self.depth -= 1;
    }

    fn enter(&mut self, path: &str) -> bool {
        if self.depth >= MAX_EXPLORE_DEPTH {
            warn!(path, depth = self.depth, "exploration depth limit reached");
            self.console
                .writeln(&format!("Exploration depth limit reached at '{}'.", path));
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn report_unsupported<T: TypeHandle>(&mut self, ty: &T) -> Outcome {
        warn!(ty = %ty, "no explorer for type");
        self.console
            .writeln(&format!("Explorer for type '{}' not yet available.\n", ty));
        Outcome::Return
    }
}
