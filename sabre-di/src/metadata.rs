//! Boundary to the class metadata reader. The processor never parses class files itself - it
//! consumes structural descriptors provided by a [ClassRegistry].

use crate::annotation::{AnnotationData, AnnotationValue};
use crate::types::{GenericType, Type};
use fxhash::FxHashMap;
#[cfg(test)]
use mockall::automock;

/// JVM access flags.
pub mod access {
    pub const PUBLIC: u16 = 0x0001;
    pub const PRIVATE: u16 = 0x0002;
    pub const PROTECTED: u16 = 0x0004;
    pub const STATIC: u16 = 0x0008;
    pub const FINAL: u16 = 0x0010;
    pub const SYNTHETIC: u16 = 0x1000;
    pub const INTERFACE: u16 = 0x0200;
    pub const ABSTRACT: u16 = 0x0400;
    pub const ANNOTATION: u16 = 0x2000;
    pub const ENUM: u16 = 0x4000;

    /// Flags which make a class impossible to instantiate directly.
    pub const NON_CONSTRUCTABLE: u16 = INTERFACE | ABSTRACT | ANNOTATION | ENUM;

    #[inline]
    pub fn is_set(flags: u16, flag: u16) -> bool {
        flags & flag != 0
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FieldMetadata {
    pub name: String,
    pub access: u16,
    pub ty: GenericType,
    pub annotations: Vec<AnnotationData>,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MethodMetadata {
    pub name: String,
    pub access: u16,
    pub arguments: Vec<GenericType>,
    pub return_type: GenericType,
    pub annotations: Vec<AnnotationData>,
    /// Annotations for each argument, in argument order.
    pub parameter_annotations: Vec<Vec<AnnotationData>>,
    /// Declared default for annotation type elements.
    pub default_value: Option<AnnotationValue>,
}

impl MethodMetadata {
    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Annotations declared on the argument with given index.
    pub fn argument_annotations(&self, index: usize) -> &[AnnotationData] {
        self.parameter_annotations
            .get(index)
            .map(|annotations| annotations.as_slice())
            .unwrap_or_default()
    }
}

/// Name of instance initialization methods.
pub const CONSTRUCTOR_NAME: &str = "<init>";

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClassMetadata {
    pub ty: Type,
    pub access: u16,
    pub super_type: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldMetadata>,
    pub methods: Vec<MethodMetadata>,
    pub annotations: Vec<AnnotationData>,
}

impl ClassMetadata {
    /// Returns the first annotation of given type.
    pub fn annotation(&self, annotation_type: &Type) -> Option<&AnnotationData> {
        self.annotations
            .iter()
            .find(|annotation| annotation.ty == *annotation_type)
    }

    #[inline]
    pub fn is_annotation_type(&self) -> bool {
        access::is_set(self.access, access::ANNOTATION)
    }
}

/// Read-only source of class metadata.
#[cfg_attr(test, automock)]
pub trait ClassRegistry {
    /// Returns metadata for given type, if known.
    fn class_metadata(&self, ty: &Type) -> Option<ClassMetadata>;

    /// Returns all classes which are subject to processing.
    fn classes(&self) -> Vec<ClassMetadata>;
}

/// [ClassRegistry] holding already parsed metadata in memory. Iteration follows insertion order.
#[derive(Clone, Debug, Default)]
pub struct InMemoryClassRegistry {
    classes: Vec<ClassMetadata>,
    indices: FxHashMap<Type, usize>,
}

impl InMemoryClassRegistry {
    /// Adds or replaces metadata for its type.
    pub fn register(&mut self, metadata: ClassMetadata) {
        if let Some(index) = self.indices.get(&metadata.ty) {
            self.classes[*index] = metadata;
        } else {
            self.indices.insert(metadata.ty.clone(), self.classes.len());
            self.classes.push(metadata);
        }
    }
}

impl FromIterator<ClassMetadata> for InMemoryClassRegistry {
    fn from_iter<I: IntoIterator<Item = ClassMetadata>>(iter: I) -> Self {
        let mut registry = Self::default();
        for metadata in iter {
            registry.register(metadata);
        }
        registry
    }
}

impl ClassRegistry for InMemoryClassRegistry {
    #[inline]
    fn class_metadata(&self, ty: &Type) -> Option<ClassMetadata> {
        self.indices
            .get(ty)
            .map(|index| self.classes[*index].clone())
    }

    #[inline]
    fn classes(&self) -> Vec<ClassMetadata> {
        self.classes.clone()
    }
}
