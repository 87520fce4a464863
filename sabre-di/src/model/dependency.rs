use crate::annotation::AnnotationData;
use crate::types::GenericType;
use std::fmt::{Display, Formatter};

/// Key identifying what can be provided or required: a type with an optional qualifier. Two
/// dependencies with the same type and different qualifiers are unrelated.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Dependency {
    pub ty: GenericType,
    pub qualifier: Option<AnnotationData>,
}

impl Dependency {
    pub fn new(ty: GenericType) -> Self {
        Self {
            ty,
            qualifier: None,
        }
    }

    pub fn qualified(ty: GenericType, qualifier: AnnotationData) -> Self {
        Self {
            ty,
            qualifier: Some(qualifier),
        }
    }

    /// Returns a dependency with a boxed type, so a provider of a primitive satisfies requirements
    /// for its wrapper and vice versa.
    pub fn boxed(&self) -> Dependency {
        Dependency {
            ty: self.ty.boxed(),
            qualifier: self.qualifier.clone(),
        }
    }
}

impl Display for Dependency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier} {}", self.ty),
            None => self.ty.fmt(f),
        }
    }
}

/// Strategy for turning a provided value into what an injection site asks for.
#[derive(Clone, Copy, Default, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Converter {
    /// The value itself.
    #[default]
    Identity,
    /// A provider handle creating values on demand.
    Provider,
    /// A lazy handle creating the value on first access.
    Lazy,
}

impl Converter {
    #[inline]
    pub fn is_identity(self) -> bool {
        self == Converter::Identity
    }
}

/// Requirement of a single injection site.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Injectee {
    pub dependency: Dependency,
    pub converter: Converter,
    pub annotations: Vec<AnnotationData>,
}

impl Injectee {
    pub fn new(dependency: Dependency, converter: Converter) -> Self {
        Self {
            dependency,
            converter,
            annotations: vec![],
        }
    }
}
