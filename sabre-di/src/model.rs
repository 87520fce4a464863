//! The dependency model built during analysis: what can be injected where, what provides it and
//! how modules and components group providers together. All entities are immutable once built and
//! are consumed read-only by validation and code generation.

pub mod component;
pub mod dependency;
pub mod injection;
pub mod provision;

pub use component::{Component, InjectionContext, Module};
pub use dependency::{Converter, Dependency, Injectee};
pub use injection::{FieldDescriptor, InjectionPoint, InjectionTarget, MethodDescriptor};
pub use provision::{Provider, ProvisionPoint, Scope};
