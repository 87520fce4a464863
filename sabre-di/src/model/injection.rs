use crate::metadata::CONSTRUCTOR_NAME;
use crate::model::dependency::Injectee;
use crate::types::{GenericType, Type};
use derivative::Derivative;
use fxhash::FxHashSet;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Field signature.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: GenericType,
}

impl Display for FieldDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// Method or constructor signature.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct MethodDescriptor {
    pub name: String,
    pub arguments: Vec<GenericType>,
    pub return_type: GenericType,
}

impl MethodDescriptor {
    pub fn new<T: ToString>(name: T, arguments: Vec<GenericType>, return_type: GenericType) -> Self {
        Self {
            name: name.to_string(),
            arguments,
            return_type,
        }
    }

    pub fn constructor(arguments: Vec<GenericType>) -> Self {
        Self::new(CONSTRUCTOR_NAME, arguments, GenericType::Raw(Type::Void))
    }

    #[inline]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

impl Display for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}): {}",
            self.name,
            self.arguments.iter().join(", "),
            self.return_type
        )
    }
}

/// A member of a target type which receives injected values.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum InjectionPoint {
    Field {
        container_type: Type,
        field: FieldDescriptor,
        is_static: bool,
        injectee: Injectee,
    },
    /// Regular methods and constructors.
    Method {
        container_type: Type,
        method: MethodDescriptor,
        is_static: bool,
        injectees: Vec<Injectee>,
    },
}

impl InjectionPoint {
    pub fn container_type(&self) -> &Type {
        match self {
            InjectionPoint::Field { container_type, .. } => container_type,
            InjectionPoint::Method { container_type, .. } => container_type,
        }
    }

    pub fn is_static(&self) -> bool {
        match self {
            InjectionPoint::Field { is_static, .. } => *is_static,
            InjectionPoint::Method { is_static, .. } => *is_static,
        }
    }

    pub fn injectees(&self) -> &[Injectee] {
        match self {
            InjectionPoint::Field { injectee, .. } => std::slice::from_ref(injectee),
            InjectionPoint::Method { injectees, .. } => injectees,
        }
    }

    /// Name of the injected member.
    pub fn member_name(&self) -> &str {
        match self {
            InjectionPoint::Field { field, .. } => &field.name,
            InjectionPoint::Method { method, .. } => &method.name,
        }
    }
}

/// A type together with all its injection points. Membership sets are derived once on
/// construction and the target never changes afterwards.
#[derive(Clone, Derivative)]
#[derivative(Debug, PartialEq, Eq)]
pub struct InjectionTarget {
    ty: Type,
    injection_points: Vec<InjectionPoint>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    injectable_fields: FxHashSet<FieldDescriptor>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    injectable_methods: FxHashSet<MethodDescriptor>,
    #[derivative(Debug = "ignore", PartialEq = "ignore")]
    injectable_constructors: FxHashSet<MethodDescriptor>,
}

impl InjectionTarget {
    pub fn new(ty: Type, injection_points: Vec<InjectionPoint>) -> Self {
        let mut injectable_fields = FxHashSet::default();
        let mut injectable_methods = FxHashSet::default();
        let mut injectable_constructors = FxHashSet::default();

        for injection_point in &injection_points {
            match injection_point {
                InjectionPoint::Field { field, .. } => {
                    injectable_fields.insert(field.clone());
                }
                InjectionPoint::Method { method, .. } if method.is_constructor() => {
                    injectable_constructors.insert(method.clone());
                }
                InjectionPoint::Method { method, .. } => {
                    injectable_methods.insert(method.clone());
                }
            }
        }

        Self {
            ty,
            injection_points,
            injectable_fields,
            injectable_methods,
            injectable_constructors,
        }
    }

    #[inline]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn injection_points(&self) -> &[InjectionPoint] {
        &self.injection_points
    }

    #[inline]
    pub fn is_injectable_field(&self, field: &FieldDescriptor) -> bool {
        self.injectable_fields.contains(field)
    }

    #[inline]
    pub fn is_injectable_method(&self, method: &MethodDescriptor) -> bool {
        self.injectable_methods.contains(method)
    }

    #[inline]
    pub fn is_injectable_constructor(&self, method: &MethodDescriptor) -> bool {
        self.injectable_constructors.contains(method)
    }

    /// Iterates over constructor injection points.
    pub fn constructors(&self) -> impl Iterator<Item = &InjectionPoint> + '_ {
        self.injection_points.iter().filter(|injection_point| {
            matches!(injection_point, InjectionPoint::Method { method, .. } if method.is_constructor())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::dependency::{Converter, Dependency, Injectee};
    use crate::model::injection::{
        FieldDescriptor, InjectionPoint, InjectionTarget, MethodDescriptor,
    };
    use crate::types::{GenericType, Type};

    fn injectee(name: &str) -> Injectee {
        Injectee::new(
            Dependency::new(GenericType::object(name)),
            Converter::Identity,
        )
    }

    #[test]
    fn should_classify_injection_points() {
        let ty = Type::object("a/Target");
        let field = FieldDescriptor {
            name: "field".to_string(),
            ty: GenericType::object("a/A"),
        };
        let method = MethodDescriptor::new(
            "setB",
            vec![GenericType::object("a/B")],
            GenericType::Raw(Type::Void),
        );
        let constructor = MethodDescriptor::constructor(vec![GenericType::object("a/C")]);

        let target = InjectionTarget::new(
            ty.clone(),
            vec![
                InjectionPoint::Field {
                    container_type: ty.clone(),
                    field: field.clone(),
                    is_static: false,
                    injectee: injectee("a/A"),
                },
                InjectionPoint::Method {
                    container_type: ty.clone(),
                    method: method.clone(),
                    is_static: false,
                    injectees: vec![injectee("a/B")],
                },
                InjectionPoint::Method {
                    container_type: ty,
                    method: constructor.clone(),
                    is_static: false,
                    injectees: vec![injectee("a/C")],
                },
            ],
        );

        assert!(target.is_injectable_field(&field));
        assert!(target.is_injectable_method(&method));
        assert!(!target.is_injectable_method(&constructor));
        assert!(target.is_injectable_constructor(&constructor));
        assert_eq!(target.constructors().count(), 1);
    }
}
