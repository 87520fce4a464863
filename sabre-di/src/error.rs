use crate::types::Type;
use itertools::Itertools;
#[cfg(test)]
use mockall::automock;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Shared pointer to an arbitrary error which caused a reported problem.
pub type ErrorPtr = Arc<dyn StdError + Send + Sync>;

/// Problems found while building and validating the injection model.
#[derive(Error, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum ProcessingError {
    #[error("Static injection is not supported: {container_type}.{member}")]
    StaticInjection { container_type: Type, member: String },
    #[error("Providable target is not a constructable class: {0}")]
    NotConstructable(Type),
    #[error("Provider returns void: {module_type}.{member}")]
    VoidProvider { module_type: Type, member: String },
    #[error("Class has multiple injectable constructors: {0}")]
    MultipleInjectableConstructors(Type),
    #[error("Cannot fully resolve annotation {0} - its defaults refer to unknown annotation types")]
    UnresolvedAnnotation(String),
    #[error("Cycled component hierarchy: {0}")]
    CycledComponent(String),
    #[error("Cycled dependency: {0}")]
    CycledDependency(String),
    #[error("Unresolved dependency {dependency} in component {component}")]
    UnresolvedDependency { dependency: String, component: Type },
    #[error("Module {module} provided multiple times by: {}", .providers.iter().join(", "))]
    ModuleProvidedMultipleTimes { module: Type, providers: Vec<String> },
    #[error("Dependency {dependency} provided multiple times by modules: {}", .modules.iter().join(", "))]
    DependencyProvidedMultipleTimes {
        dependency: String,
        modules: Vec<Type>,
    },
    #[error("Component {0} is not reachable from any root component")]
    AbandonedComponent(Type),
    #[error("Unresolved dependency {dependency} of members injected into {target}")]
    UnresolvedMemberDependency { dependency: String, target: Type },
}

/// A [ProcessingError] with its optional cause.
#[derive(Clone, Debug)]
pub struct ReportedError {
    pub error: ProcessingError,
    pub cause: Option<ErrorPtr>,
}

impl Display for ReportedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} (caused by: {})", self.error, cause),
            None => self.error.fmt(f),
        }
    }
}

/// Sink for problems found during processing. Reporting an error never interrupts processing -
/// callers decide if processing failed after all checks are done by looking at
/// [ErrorReporter::has_errors].
#[cfg_attr(test, automock)]
pub trait ErrorReporter {
    fn report_error(&mut self, error: ProcessingError);

    fn report_error_with_cause(&mut self, error: ProcessingError, cause: ErrorPtr);

    fn has_errors(&self) -> bool;
}

/// [ErrorReporter] which keeps all errors in reporting order.
#[derive(Clone, Debug, Default)]
pub struct CollectingErrorReporter {
    errors: Vec<ReportedError>,
}

impl CollectingErrorReporter {
    #[inline]
    pub fn errors(&self) -> &[ReportedError] {
        &self.errors
    }

    #[inline]
    pub fn into_errors(self) -> Vec<ReportedError> {
        self.errors
    }

    fn push(&mut self, error: ReportedError) {
        error!("{}", error);
        self.errors.push(error);
    }
}

impl ErrorReporter for CollectingErrorReporter {
    fn report_error(&mut self, error: ProcessingError) {
        self.push(ReportedError { error, cause: None });
    }

    fn report_error_with_cause(&mut self, error: ProcessingError, cause: ErrorPtr) {
        self.push(ReportedError {
            error,
            cause: Some(cause),
        });
    }

    #[inline]
    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
