use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("node key must not be empty")]
    EmptyKey,

    #[error("node key {0:?} contains a control character")]
    ControlCharacter(String),
}
