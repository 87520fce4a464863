use crate::model::dependency::{Dependency, Injectee};
use crate::model::injection::{FieldDescriptor, MethodDescriptor};
use crate::types::Type;
use std::fmt::{Display, Formatter};

/// Describes how a [Dependency] gets produced.
///
/// Provision points which are not directly callable from generated code, e.g. private methods,
/// carry a `bridge` - a synthetic method which should be called instead.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProvisionPoint {
    /// Constructor of the provided type itself.
    Constructor {
        container_type: Type,
        dependency: Dependency,
        method: MethodDescriptor,
        injectees: Vec<Injectee>,
        bridge: Option<MethodDescriptor>,
    },
    /// Module method returning the provided value.
    Method {
        container_type: Type,
        dependency: Dependency,
        method: MethodDescriptor,
        injectees: Vec<Injectee>,
        bridge: Option<MethodDescriptor>,
    },
    /// Module field holding the provided value.
    Field {
        container_type: Type,
        dependency: Dependency,
        field: FieldDescriptor,
        bridge: Option<MethodDescriptor>,
    },
    /// Pass-through from one dependency to another, e.g. an interface to its implementation.
    Binding {
        container_type: Type,
        dependency: Dependency,
        binding: Injectee,
    },
}

impl ProvisionPoint {
    /// Type declaring the provision point.
    pub fn container_type(&self) -> &Type {
        match self {
            ProvisionPoint::Constructor { container_type, .. }
            | ProvisionPoint::Method { container_type, .. }
            | ProvisionPoint::Field { container_type, .. }
            | ProvisionPoint::Binding { container_type, .. } => container_type,
        }
    }

    /// The provided dependency.
    pub fn dependency(&self) -> &Dependency {
        match self {
            ProvisionPoint::Constructor { dependency, .. }
            | ProvisionPoint::Method { dependency, .. }
            | ProvisionPoint::Field { dependency, .. }
            | ProvisionPoint::Binding { dependency, .. } => dependency,
        }
    }

    /// Requirements which must be satisfied to provide the dependency.
    pub fn injectees(&self) -> &[Injectee] {
        match self {
            ProvisionPoint::Constructor { injectees, .. }
            | ProvisionPoint::Method { injectees, .. } => injectees,
            ProvisionPoint::Field { .. } => &[],
            ProvisionPoint::Binding { binding, .. } => std::slice::from_ref(binding),
        }
    }

    pub fn bridge(&self) -> Option<&MethodDescriptor> {
        match self {
            ProvisionPoint::Constructor { bridge, .. }
            | ProvisionPoint::Method { bridge, .. }
            | ProvisionPoint::Field { bridge, .. } => bridge.as_ref(),
            ProvisionPoint::Binding { .. } => None,
        }
    }

    /// Name of the providing member, for diagnostics.
    pub fn member_name(&self) -> &str {
        match self {
            ProvisionPoint::Constructor { method, .. } | ProvisionPoint::Method { method, .. } => {
                &method.name
            }
            ProvisionPoint::Field { field, .. } => &field.name,
            ProvisionPoint::Binding { .. } => "<binding>",
        }
    }
}

/// Lifecycle of provided values.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Scope {
    /// A new value for every injection.
    #[default]
    None,
    /// One value per component instance.
    Singleton,
}

/// A generated unit producing one dependency.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Provider {
    pub provider_type: Type,
    pub module_type: Type,
    pub provision_point: ProvisionPoint,
    pub scope: Scope,
}

impl Provider {
    #[inline]
    pub fn dependency(&self) -> &Dependency {
        self.provision_point.dependency()
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}.{})",
            self.dependency(),
            self.module_type,
            self.provision_point.member_name()
        )
    }
}
