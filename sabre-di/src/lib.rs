//! Compile-time dependency injection model.
//!
//! Classes described by a [ClassRegistry](metadata::ClassRegistry) are analyzed for injection
//! annotations by the [Analyzer](analyzer::Analyzer), which produces an
//! [InjectionContext](model::InjectionContext) - components, modules, providers and injection
//! targets of the whole program. The [Validator](validator::Validator) then checks the context for
//! consistency: duplicate bindings, unresolved dependencies, dependency and component cycles, and
//! unreachable components. Every problem is reported to an [ErrorReporter], so a single run
//! reveals all of them.

pub mod analyzer;
pub mod annotation;
mod error;
pub mod graph;
pub mod metadata;
pub mod model;
pub mod resolver;
pub mod types;
pub mod validator;

pub use error::{
    CollectingErrorReporter, ErrorPtr, ErrorReporter, ProcessingError, ReportedError,
};
