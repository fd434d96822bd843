use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Which tag a helper-method reference came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TagKind {
    Validity,
    Priority,
}

impl Display for TagKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TagKind::Validity => write!(f, "validity"),
            TagKind::Priority => write!(f, "priority"),
        }
    }
}

/// Build-time failures. Any of these aborts model construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("type #{index} is not part of the resolver's universe")]
    UnknownType { index: usize },
    #[error("{provider}: {tag} tag references missing method `{reference}`")]
    MissingReference {
        provider: String,
        tag: TagKind,
        reference: String,
    },
    #[error("{provider}: {tag} tag reference `{reference}` is ambiguous ({matches} matches)")]
    AmbiguousReference {
        provider: String,
        tag: TagKind,
        reference: String,
        matches: usize,
    },
    #[error("{method} is tagged to implement {operation} but cannot be invoked in its place")]
    Infeasible { method: String, operation: String },
    #[error(
        "{method}: parameter {position} maps to argument {index}, but {operation} takes {arity}"
    )]
    ParamIndexOutOfBounds {
        method: String,
        operation: String,
        position: usize,
        index: usize,
        arity: usize,
    },
}
