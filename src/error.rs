//! Command failures that are recovered at the command boundary and rendered as chat responses
//! rather than propagated.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The message matched a command keyword but not that command's grammar.
    #[error("that is the incorrect command syntax")]
    Syntax,
    /// A separator-free token matched no class group.
    #[error("`{0}` is not an available class group")]
    UnknownClassGroup(String),
    /// A full class name matched no class.
    #[error("`{0}` is not an available class")]
    UnknownClass(String),
    /// A token matched no role name.
    #[error("`{0}` is not a role")]
    UnknownRole(String),
}
