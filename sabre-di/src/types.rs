//! Types as seen by the processor. A [Type] is the erased, descriptor-level view of a class,
//! primitive or array, while a [GenericType] keeps type arguments, which are significant when
//! matching dependencies, e.g. `List<String>` and `List<Integer>` are different dependencies.

use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Primitive JVM types.
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// Internal name of the wrapper class for this primitive.
    pub fn boxed_name(self) -> &'static str {
        match self {
            Primitive::Boolean => "java/lang/Boolean",
            Primitive::Byte => "java/lang/Byte",
            Primitive::Char => "java/lang/Character",
            Primitive::Short => "java/lang/Short",
            Primitive::Int => "java/lang/Integer",
            Primitive::Long => "java/lang/Long",
            Primitive::Float => "java/lang/Float",
            Primitive::Double => "java/lang/Double",
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }
}

/// An erased type.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    Void,
    Primitive(Primitive),
    /// Class, interface, enum or annotation type identified by its internal name, e.g.
    /// `java/lang/String`.
    Object(String),
    Array(Box<Type>),
}

impl Type {
    /// Convenience constructor for [Type::Object].
    pub fn object<T: ToString>(internal_name: T) -> Self {
        Type::Object(internal_name.to_string())
    }

    /// Returns the wrapper class type for primitives; other types are returned unchanged.
    pub fn boxed(&self) -> Type {
        match self {
            Type::Primitive(primitive) => Type::object(primitive.boxed_name()),
            other => other.clone(),
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    /// Internal name for object types.
    pub fn internal_name(&self) -> Option<&str> {
        match self {
            Type::Object(name) => Some(name),
            _ => None,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Void => f.write_str("void"),
            Type::Primitive(primitive) => f.write_str(primitive.keyword()),
            Type::Object(name) => f.write_str(name),
            Type::Array(element) => write!(f, "{element}[]"),
        }
    }
}

/// A type with its type arguments.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum GenericType {
    Raw(Type),
    Parameterized {
        raw: Type,
        arguments: Vec<GenericType>,
    },
    Array(Box<GenericType>),
}

impl GenericType {
    /// Convenience constructor for a raw object type.
    pub fn object<T: ToString>(internal_name: T) -> Self {
        GenericType::Raw(Type::object(internal_name))
    }

    /// Convenience constructor for a parameterized object type.
    pub fn parameterized<T: ToString>(internal_name: T, arguments: Vec<GenericType>) -> Self {
        GenericType::Parameterized {
            raw: Type::object(internal_name),
            arguments,
        }
    }

    /// Boxes raw primitives. Parameterized and array types are never primitive, so they are
    /// returned unchanged.
    pub fn boxed(&self) -> GenericType {
        match self {
            GenericType::Raw(ty) => GenericType::Raw(ty.boxed()),
            other => other.clone(),
        }
    }

    /// Returns the erasure of this type.
    pub fn raw_type(&self) -> Type {
        match self {
            GenericType::Raw(ty) => ty.clone(),
            GenericType::Parameterized { raw, .. } => raw.clone(),
            GenericType::Array(element) => Type::Array(Box::new(element.raw_type())),
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, GenericType::Raw(Type::Void))
    }
}

impl From<Type> for GenericType {
    #[inline]
    fn from(value: Type) -> Self {
        GenericType::Raw(value)
    }
}

impl Display for GenericType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenericType::Raw(ty) => ty.fmt(f),
            GenericType::Parameterized { raw, arguments } => {
                write!(f, "{raw}<{}>", arguments.iter().join(", "))
            }
            GenericType::Array(element) => write!(f, "{element}[]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{GenericType, Primitive, Type};

    #[test]
    fn should_box_primitives() {
        assert_eq!(
            Type::Primitive(Primitive::Int).boxed(),
            Type::object("java/lang/Integer")
        );
        assert_eq!(
            Type::Primitive(Primitive::Char).boxed(),
            Type::object("java/lang/Character")
        );
        assert_eq!(Type::object("a/B").boxed(), Type::object("a/B"));
    }

    #[test]
    fn should_not_box_primitive_arrays() {
        let array = Type::Array(Box::new(Type::Primitive(Primitive::Int)));
        assert_eq!(array.boxed(), array);
    }

    #[test]
    fn should_erase_generic_types() {
        let list = GenericType::parameterized("java/util/List", vec![GenericType::object("a/B")]);
        assert_eq!(list.raw_type(), Type::object("java/util/List"));
        assert_eq!(list.to_string(), "java/util/List<a/B>");
    }
}
