//! # polyface
//!
//! Runtime multiple dispatch of facade operations onto independently declared
//! provider methods.
//!
//! A [`TypeUniverse`](types::TypeUniverse) describes facades (abstract contracts) and
//! providers (concrete types whose methods are tagged to serve facade operations). The
//! [`StaticResolver`](resolver::StaticResolver) turns a facade and a provider list into
//! an immutable [`ResolutionModel`](resolver::ResolutionModel), and a
//! [`Dispatcher`](engine::Dispatcher) picks the best candidate and provider instance for
//! each call from the run-time argument types, validity gates and priorities.
//!
//! ## Crates
//!
//! - **[`types`]**: Host object model, assignability and generic erasure.
//! - **[`resolver`]**: Build-time resolution of facade operations to candidates.
//! - **[`engine`]**: Direct and cached dispatch engines, instance sources and the
//!   [`FacadeProxy`](engine::FacadeProxy) shim.
pub use polyface_engine as engine;
pub use polyface_resolver as resolver;
pub use polyface_types as types;
