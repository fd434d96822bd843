use polyface_types::error::InvocationError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    /// A validity or priority method failed; the error is passed through untouched.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    #[error("Priority method {method} returned non-numeric value {value}")]
    InvalidPriority { method: String, value: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FacadeError {
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },
    #[error("Unknown operation {name} with {arity} arguments")]
    UnknownOperation { name: String, arity: usize },
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}
