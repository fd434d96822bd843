use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypeError {
    #[error("Type not found: {0}")]
    TypeNotFound(String),
    #[error("Duplicate type definition: {0}")]
    DuplicateType(String),
    #[error("Invalid superclass for {type_name}: {superclass} is not a class")]
    InvalidSuperclass {
        type_name: String,
        superclass: String,
    },
    #[error("Invalid interface for {type_name}: {interface} is not an interface")]
    InvalidInterface { type_name: String, interface: String },
    #[error("Generic arity mismatch for {type_name}: expected {expected} arguments, found {found}")]
    GenericArity {
        type_name: String,
        expected: usize,
        found: usize,
    },
    #[error("Cyclic type hierarchy involving {0}")]
    CyclicHierarchy(String),
}

/// Failure raised by caller-supplied method bodies.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvocationError {
    #[error("Instance method invoked without a receiver")]
    MissingReceiver,
    #[error("Argument count mismatch: expected {expected}, found {found}")]
    ArgumentCount { expected: usize, found: usize },
    #[error("Argument {index} is not a {expected}")]
    ArgumentType { index: usize, expected: String },
    #[error("{0}")]
    Failed(String),
}

impl InvocationError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
