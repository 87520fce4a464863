//! Annotation instances and their resolution against annotation type declarations.
//!
//! Annotation data read from class files only contains explicitly specified values. Missing
//! values need to be filled in from defaults declared on the annotation type itself, which in
//! turn can contain nested annotations requiring defaults of other annotation types. Since
//! annotation types can be discovered in any order, the [AnnotationRegistry] tolerates forward
//! references: resolving data which (transitively) refers to an annotation type with unknown
//! defaults produces a partially resolved result, which is signalled by
//! [AnnotationData::resolved] being `false`. Once the missing type gets registered, resolving
//! the same data again yields a fully resolved result.

use crate::types::Type;
use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

/// A single annotation element value.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationValue {
    Boolean(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    /// IEEE 754 bits of a `float` value, which keeps structural equality total.
    Float(u32),
    /// IEEE 754 bits of a `double` value.
    Double(u64),
    String(String),
    Type(Type),
    Enum { ty: Type, value: String },
    Annotation(AnnotationData),
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    #[inline]
    pub fn float(value: f32) -> Self {
        AnnotationValue::Float(value.to_bits())
    }

    #[inline]
    pub fn double(value: f64) -> Self {
        AnnotationValue::Double(value.to_bits())
    }
}

impl Display for AnnotationValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationValue::Boolean(value) => write!(f, "{value}"),
            AnnotationValue::Byte(value) => write!(f, "{value}"),
            AnnotationValue::Char(value) => write!(f, "'{value}'"),
            AnnotationValue::Short(value) => write!(f, "{value}"),
            AnnotationValue::Int(value) => write!(f, "{value}"),
            AnnotationValue::Long(value) => write!(f, "{value}L"),
            AnnotationValue::Float(bits) => write!(f, "{}f", f32::from_bits(*bits)),
            AnnotationValue::Double(bits) => write!(f, "{}", f64::from_bits(*bits)),
            AnnotationValue::String(value) => write!(f, "{value:?}"),
            AnnotationValue::Type(ty) => write!(f, "{ty}.class"),
            AnnotationValue::Enum { ty, value } => write!(f, "{ty}.{value}"),
            AnnotationValue::Annotation(data) => data.fmt(f),
            AnnotationValue::Array(values) => {
                f.write_str("{")?;
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    value.fmt(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// An annotation instance. Equality is structural, so two instances of the same annotation type
/// with the same values are equal regardless of where they were declared.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct AnnotationData {
    pub ty: Type,
    pub values: BTreeMap<String, AnnotationValue>,
    /// Whether all defaults, including the ones of nested annotations, have been applied.
    pub resolved: bool,
}

impl AnnotationData {
    /// Creates unresolved annotation data, as read from a class file.
    pub fn new(ty: Type, values: BTreeMap<String, AnnotationValue>) -> Self {
        Self {
            ty,
            values,
            resolved: false,
        }
    }

    /// Creates unresolved annotation data without any explicit values.
    pub fn marker(ty: Type) -> Self {
        Self::new(ty, Default::default())
    }

    #[inline]
    pub fn value(&self, name: &str) -> Option<&AnnotationValue> {
        self.values.get(name)
    }

    /// Returns the boolean value with the given name, if present.
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.value(name) {
            Some(AnnotationValue::Boolean(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns the class values with the given name. Both single values and arrays are accepted.
    pub fn types(&self, name: &str) -> Vec<Type> {
        match self.value(name) {
            Some(AnnotationValue::Type(ty)) => vec![ty.clone()],
            Some(AnnotationValue::Array(values)) => values
                .iter()
                .filter_map(|value| match value {
                    AnnotationValue::Type(ty) => Some(ty.clone()),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

impl Display for AnnotationData {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.ty)?;
        if !self.values.is_empty() {
            f.write_str("(")?;
            for (index, (name, value)) in self.values.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name} = {value}")?;
            }
            f.write_str(")")?;
        }

        Ok(())
    }
}

#[derive(Clone, Debug)]
struct ResolvedDefaults {
    values: BTreeMap<String, AnnotationValue>,
    resolved: bool,
}

/// Registry of annotation type defaults. See module documentation for details.
#[derive(Clone, Debug, Default)]
pub struct AnnotationRegistry {
    defaults: FxHashMap<Type, BTreeMap<String, AnnotationValue>>,
    resolved_defaults: FxHashMap<Type, ResolvedDefaults>,
}

impl AnnotationRegistry {
    /// Records default values declared by the given annotation type. Registering the same type
    /// again is ignored and the first registration wins. Returns `true` if the defaults have been
    /// registered.
    pub fn register_defaults(
        &mut self,
        annotation_type: Type,
        defaults: BTreeMap<String, AnnotationValue>,
    ) -> bool {
        if self.defaults.contains_key(&annotation_type) {
            warn!(
                "Annotation defaults for {} are already registered, ignoring.",
                annotation_type
            );
            return false;
        }

        debug!("Registering annotation defaults for {}", annotation_type);

        self.defaults.insert(annotation_type, defaults);

        // partial results might depend on the new type
        self.resolved_defaults
            .retain(|_, defaults| defaults.resolved);

        true
    }

    #[inline]
    pub fn is_registered(&self, annotation_type: &Type) -> bool {
        self.defaults.contains_key(annotation_type)
    }

    /// Fills in missing values of given data with annotation type defaults.
    pub fn resolve(&mut self, data: &AnnotationData) -> AnnotationData {
        let mut referenced_types = vec![data.ty.clone()];
        for value in data.values.values() {
            collect_annotation_types(value, &mut referenced_types);
        }

        self.resolve_defaults(referenced_types);
        self.apply_defaults(data)
    }

    // Post-order walk over the graph of annotation types referenced by defaults, so each type is
    // resolved only after all types its defaults refer to.
    fn resolve_defaults(&mut self, roots: Vec<Type>) {
        let mut stack = roots
            .into_iter()
            .rev()
            .map(|ty| (ty, false))
            .collect::<Vec<_>>();
        let mut in_progress = FxHashSet::default();

        while let Some((ty, expanded)) = stack.pop() {
            if self.resolved_defaults.contains_key(&ty) {
                continue;
            }

            if expanded {
                let resolved = self.resolve_declared_defaults(&ty);
                in_progress.remove(&ty);
                self.resolved_defaults.insert(ty, resolved);
                continue;
            }

            // a reference cycle leaves the referring type partially resolved
            if in_progress.contains(&ty) {
                continue;
            }

            let Some(defaults) = self.defaults.get(&ty) else {
                continue;
            };

            let mut referenced_types = vec![];
            for value in defaults.values() {
                collect_annotation_types(value, &mut referenced_types);
            }

            in_progress.insert(ty.clone());
            stack.push((ty, true));
            stack.extend(
                referenced_types
                    .into_iter()
                    .filter(|referenced| {
                        !self.resolved_defaults.contains_key(referenced)
                            && !in_progress.contains(referenced)
                    })
                    .map(|referenced| (referenced, false)),
            );
        }
    }

    fn resolve_declared_defaults(&self, ty: &Type) -> ResolvedDefaults {
        let mut result = ResolvedDefaults {
            values: BTreeMap::new(),
            resolved: true,
        };

        if let Some(defaults) = self.defaults.get(ty) {
            for (name, value) in defaults {
                let (value, resolved) = self.apply_value_defaults(value);
                result.resolved &= resolved;
                result.values.insert(name.clone(), value);
            }
        }

        result
    }

    fn apply_defaults(&self, data: &AnnotationData) -> AnnotationData {
        let (mut values, mut resolved) = match self.resolved_defaults.get(&data.ty) {
            Some(defaults) => (defaults.values.clone(), defaults.resolved),
            None => (BTreeMap::new(), false),
        };

        for (name, value) in &data.values {
            let (value, value_resolved) = self.apply_value_defaults(value);
            resolved &= value_resolved;
            values.insert(name.clone(), value);
        }

        AnnotationData {
            ty: data.ty.clone(),
            values,
            resolved,
        }
    }

    fn apply_value_defaults(&self, value: &AnnotationValue) -> (AnnotationValue, bool) {
        match value {
            AnnotationValue::Annotation(data) => {
                let data = self.apply_defaults(data);
                let resolved = data.resolved;
                (AnnotationValue::Annotation(data), resolved)
            }
            AnnotationValue::Array(values) => {
                let mut resolved = true;
                let values = values
                    .iter()
                    .map(|value| {
                        let (value, value_resolved) = self.apply_value_defaults(value);
                        resolved &= value_resolved;
                        value
                    })
                    .collect();

                (AnnotationValue::Array(values), resolved)
            }
            other => (other.clone(), true),
        }
    }
}

fn collect_annotation_types(value: &AnnotationValue, types: &mut Vec<Type>) {
    match value {
        AnnotationValue::Annotation(data) => {
            types.push(data.ty.clone());
            for value in data.values.values() {
                collect_annotation_types(value, types);
            }
        }
        AnnotationValue::Array(values) => {
            for value in values {
                collect_annotation_types(value, types);
            }
        }
        _ => {}
    }
}
