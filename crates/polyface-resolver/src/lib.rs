//! # polyface-resolver
//!
//! Static resolution of facade operations to the provider methods able to serve them.
//! A [`ResolutionModel`] is built once per facade and provider set, then shared read-only
//! by every dispatch.
//!
//! ## Core Types
//!
//! - **[`StaticResolver`]**: Scans providers and builds models.
//! - **[`ResolutionModel`]**: The immutable operation-to-candidates mapping.
//! - **[`CandidateMethod`](model::CandidateMethod)**: One provider method with its argument
//!   mapping, validity gate and priority.
//! - **[`ResolutionError`](error::ResolutionError)**: Build-time failures.
pub mod error;
pub mod model;
mod references;
pub mod resolver;

pub use error::{ResolutionError, TagKind};
pub use model::{
    CandidateMethod, FacadeOperation, ModelId, OperationBinding, PriorityDescriptor,
    ResolutionModel, TagDescriptor, ValidityDescriptor,
};
pub use resolver::StaticResolver;
