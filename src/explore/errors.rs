//! Error types for the exploration engine and its collaborators
//!
//! Two layers of errors exist:
//!
//! - [`InspectError`] is produced by a host (the [`Inspector`] and the value
//!   and type handles it hands out). Inside the engine these are always
//!   reported to the console and never propagated.
//! - [`ExploreError`] is produced by the `explore` commands themselves and
//!   aborts the command.
//!
//! [`Inspector`]: super::host::Inspector

use crate::parser::parse::ParseError;

/// Failures reported by a host while evaluating or reading the inspected program
#[derive(Debug, Clone, thiserror::Error)]
pub enum InspectError {
    /// A read touched memory that is not mapped in the inspected program
    #[error("Cannot access memory at address 0x{address:x}")]
    UnreadableMemory { address: u64 },

    #[error("No symbol \"{name}\" in current context.")]
    NoSymbol { name: String },

    #[error("No type named {name}.")]
    UnknownType { name: String },

    /// The operation makes no sense for the value or type it was applied to
    #[error("{message}")]
    InvalidOperation { message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl InspectError {
    pub fn invalid(message: impl Into<String>) -> Self {
        InspectError::InvalidOperation {
            message: message.into(),
        }
    }
}

/// Command-level failures of `explore`, `explore value` and `explore type`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExploreError {
    #[error("ERROR: '{command}' requires an argument.")]
    MissingArgument { command: &'static str },

    #[error("'{0}' neither evaluates to a value nor is a type in the current context.")]
    NeitherValueNorType(String),

    #[error("'{0}' does not evaluate to a value in the current context.")]
    NotAValue(String),

    #[error("'{0}' is not a type or value in the current context.")]
    NotATypeOrValue(String),
}
