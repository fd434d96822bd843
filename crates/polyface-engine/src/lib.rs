//! # polyface-engine
//!
//! Runtime dispatch of facade operations over a [`ResolutionModel`].
//!
//! ## Engines
//!
//! - **[`DirectDispatcher`](direct::DirectDispatcher)**: Filters and ranks every candidate on
//!   every call.
//! - **[`CachedDispatcher`](cached::CachedDispatcher)**: Memoizes the static ranking per
//!   argument-type signature and skips evaluation entirely when no candidate declares a
//!   validity or dynamic priority method.
//!
//! ## Collaborators
//!
//! - **[`InstanceSource`](source::InstanceSource)**: Supplies provider instances.
//! - **[`FacadeProxy`](proxy::FacadeProxy)**: Turns facade calls into dispatches.
//! - **[`EngineConfig`](config::EngineConfig)**: Selects an engine, optionally from the
//!   environment.
use polyface_resolver::ResolutionModel;
use polyface_types::{members::MethodDescription, value::Value};

pub mod cached;
pub mod config;
pub mod decision;
pub mod direct;
pub mod error;
mod evaluation;
pub mod metrics;
pub mod proxy;
pub mod ranking;
pub mod source;

#[cfg(test)]
mod dispatch_tests;

pub use cached::CachedDispatcher;
pub use config::{DispatchMode, EngineConfig};
pub use decision::DispatchDecision;
pub use direct::DirectDispatcher;
pub use error::{DispatchError, FacadeError};
pub use metrics::{DispatchMetrics, DispatchStats};
pub use proxy::FacadeProxy;
pub use source::{InstanceRegistry, InstanceSource};

/// Selects one candidate method and provider instance for a call.
///
/// `Ok(None)` means no compatible, valid candidate with an available instance exists.
/// Failures raised by validity, priority or candidate code surface as errors untouched.
pub trait Dispatcher: Send + Sync {
    fn dispatch(
        &self,
        model: &ResolutionModel,
        operation: MethodDescription,
        args: &[Value],
        source: &dyn InstanceSource,
    ) -> Result<Option<DispatchDecision>, DispatchError>;

    fn statistics(&self) -> DispatchStats;
}
