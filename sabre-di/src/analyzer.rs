//! Builds an [InjectionContext] from class metadata.
//!
//! The analyzer recognizes the following annotations:
//!
//! * `@javax/inject/Inject` on fields and methods - member injection; on constructors - the class
//! becomes a providable target
//! * `@javax/inject/Singleton` - singleton scope for providers
//! * annotations meta-annotated with `@javax/inject/Qualifier` (and `@javax/inject/Named`) -
//! dependency qualifiers
//! * `@sabre/Module` - module classes; `@sabre/Component(root, subcomponents)` - components, which
//! are also their own default module
//! * `@sabre/Import(value)` on modules and components - imported modules
//! * `@sabre/Provide` on module methods and fields - provision points
//! * `@sabre/ProvidedBy(value)` on providable targets - modules providing the target through its
//! constructor
//! * `@sabre/ProvidedAs(value)` on providable targets - additional types bound to the target in
//! the same modules
//!
//! Injected `javax/inject/Provider<T>` and `sabre/Lazy<T>` values are treated as wrapped `T`
//! dependencies.

use crate::annotation::{AnnotationData, AnnotationRegistry, AnnotationValue};
use crate::error::{ErrorReporter, ProcessingError};
use crate::metadata::{access, ClassMetadata, ClassRegistry, FieldMetadata, MethodMetadata};
use crate::model::{
    Component, Converter, Dependency, FieldDescriptor, InjectionContext, InjectionPoint,
    InjectionTarget, Injectee, MethodDescriptor, Module, Provider, ProvisionPoint, Scope,
};
use crate::types::{GenericType, Type};
use fxhash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Internal names of recognized types.
pub mod names {
    pub const INJECT: &str = "javax/inject/Inject";
    pub const QUALIFIER: &str = "javax/inject/Qualifier";
    pub const NAMED: &str = "javax/inject/Named";
    pub const SINGLETON: &str = "javax/inject/Singleton";
    pub const PROVIDER: &str = "javax/inject/Provider";
    pub const LAZY: &str = "sabre/Lazy";
    pub const COMPONENT: &str = "sabre/Component";
    pub const MODULE: &str = "sabre/Module";
    pub const IMPORT: &str = "sabre/Import";
    pub const PROVIDE: &str = "sabre/Provide";
    pub const PROVIDED_BY: &str = "sabre/ProvidedBy";
    pub const PROVIDED_AS: &str = "sabre/ProvidedAs";

    /// The implicit root of the component hierarchy.
    pub const PACKAGE_COMPONENT: &str = "sabre/internal/PackageComponent";
}

const PROVIDER_INFIX: &str = "$SabreProvider$";

/// Analyzer of classes provided by a [ClassRegistry]. See module documentation for supported
/// annotations.
pub struct Analyzer<'a> {
    registry: &'a dyn ClassRegistry,
    annotations: AnnotationRegistry,
    qualifiers: FxHashMap<Type, bool>,
    // only modules whose imports don't depend on the path they were reached through
    modules: FxHashMap<Type, Module>,
    contributed_providers: FxHashMap<Type, Vec<(ProvisionPoint, Scope)>>,
    unresolved_annotations: FxHashSet<AnnotationData>,
}

impl<'a> Analyzer<'a> {
    pub fn new(registry: &'a dyn ClassRegistry) -> Self {
        Self {
            registry,
            annotations: AnnotationRegistry::default(),
            qualifiers: Default::default(),
            modules: Default::default(),
            contributed_providers: Default::default(),
            unresolved_annotations: Default::default(),
        }
    }

    /// Analyzes all classes from the registry. Model errors are reported and analysis continues,
    /// so the result should only be used if the reporter has no errors after validation.
    pub fn analyze(mut self, reporter: &mut dyn ErrorReporter) -> InjectionContext {
        let classes = self.registry.classes();
        info!("Analyzing {} classes...", classes.len());

        self.register_annotation_defaults(&classes);

        let mut injectable_targets = vec![];
        let mut providable_targets = vec![];

        for class in &classes {
            let injection_points = self.injection_points(class, reporter);
            if injection_points.is_empty() {
                continue;
            }

            let (constructors, members): (Vec<_>, Vec<_>) =
                injection_points.iter().cloned().partition(|injection_point| {
                    matches!(injection_point, InjectionPoint::Method { method, .. } if method.is_constructor())
                });

            if !members.is_empty() {
                debug!("Found injectable target {}", class.ty);
                injectable_targets.push(InjectionTarget::new(class.ty.clone(), members));
            }

            if !constructors.is_empty() {
                debug!("Found providable target {}", class.ty);
                self.contribute_providers(class, &constructors, reporter);
                providable_targets.push(InjectionTarget::new(class.ty.clone(), injection_points));
            }
        }

        let components = self.components(&classes, reporter);

        InjectionContext::new(
            Type::object(names::PACKAGE_COMPONENT),
            components,
            injectable_targets,
            providable_targets,
        )
    }

    fn register_annotation_defaults(&mut self, classes: &[ClassMetadata]) {
        for class in classes.iter().filter(|class| class.is_annotation_type()) {
            let defaults = class
                .methods
                .iter()
                .filter_map(|method| {
                    method
                        .default_value
                        .clone()
                        .map(|value| (method.name.clone(), value))
                })
                .collect();

            self.annotations.register_defaults(class.ty.clone(), defaults);
        }

        let empty_types = || AnnotationValue::Array(vec![]);
        let builtin_defaults = [
            (names::INJECT, vec![]),
            (names::QUALIFIER, vec![]),
            (names::NAMED, vec![("value", AnnotationValue::String(String::new()))]),
            (names::SINGLETON, vec![]),
            (names::MODULE, vec![]),
            (names::PROVIDE, vec![]),
            (
                names::COMPONENT,
                vec![
                    ("root", AnnotationValue::Boolean(false)),
                    ("subcomponents", empty_types()),
                ],
            ),
            (names::IMPORT, vec![("value", empty_types())]),
            (names::PROVIDED_BY, vec![("value", empty_types())]),
            (names::PROVIDED_AS, vec![("value", empty_types())]),
        ];

        for (name, defaults) in builtin_defaults {
            let ty = Type::object(name);
            if !self.annotations.is_registered(&ty) {
                self.annotations.register_defaults(
                    ty,
                    defaults
                        .into_iter()
                        .map(|(name, value)| (name.to_string(), value))
                        .collect::<BTreeMap<_, _>>(),
                );
            }
        }
    }

    fn resolved_annotation(
        &mut self,
        annotations: &[AnnotationData],
        name: &str,
    ) -> Option<AnnotationData> {
        let ty = Type::object(name);
        annotations
            .iter()
            .find(|annotation| annotation.ty == ty)
            .map(|annotation| self.annotations.resolve(annotation))
    }

    fn is_qualifier(&mut self, annotation_type: &Type) -> bool {
        if let Some(is_qualifier) = self.qualifiers.get(annotation_type) {
            return *is_qualifier;
        }

        let qualifier_type = Type::object(names::QUALIFIER);
        let is_qualifier = *annotation_type == Type::object(names::NAMED)
            || self
                .registry
                .class_metadata(annotation_type)
                .map(|metadata| metadata.annotation(&qualifier_type).is_some())
                .unwrap_or(false);

        self.qualifiers
            .insert(annotation_type.clone(), is_qualifier);
        is_qualifier
    }

    fn qualifier(
        &mut self,
        annotations: &[AnnotationData],
        owner: &dyn Display,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<AnnotationData> {
        let mut qualifiers = vec![];
        for annotation in annotations {
            if self.is_qualifier(&annotation.ty) {
                qualifiers.push(annotation);
            }
        }

        if qualifiers.len() > 1 {
            warn!("Multiple qualifiers found on {}, using the first one", owner);
        }

        let qualifier = self.annotations.resolve(qualifiers.first()?);
        if !qualifier.resolved && self.unresolved_annotations.insert(qualifier.clone()) {
            reporter.report_error(ProcessingError::UnresolvedAnnotation(qualifier.to_string()));
        }

        Some(qualifier)
    }

    fn scope(annotations: &[AnnotationData]) -> Scope {
        if has_annotation(annotations, names::SINGLETON) {
            Scope::Singleton
        } else {
            Scope::None
        }
    }

    fn injectee(
        &mut self,
        ty: &GenericType,
        annotations: &[AnnotationData],
        owner: &dyn Display,
        reporter: &mut dyn ErrorReporter,
    ) -> Injectee {
        let (ty, converter) = match ty {
            GenericType::Parameterized {
                raw: Type::Object(name),
                arguments,
            } if arguments.len() == 1 && (name == names::PROVIDER || name == names::LAZY) => {
                let converter = if name == names::PROVIDER {
                    Converter::Provider
                } else {
                    Converter::Lazy
                };
                (arguments[0].clone(), converter)
            }
            other => (other.clone(), Converter::Identity),
        };

        let qualifier = self.qualifier(annotations, owner, reporter);
        let annotations = annotations
            .iter()
            .map(|annotation| self.annotations.resolve(annotation))
            .collect();

        Injectee {
            dependency: Dependency { ty, qualifier },
            converter,
            annotations,
        }
    }

    fn method_injectees(
        &mut self,
        class: &ClassMetadata,
        method: &MethodMetadata,
        reporter: &mut dyn ErrorReporter,
    ) -> Vec<Injectee> {
        let owner = format!("{}.{}", class.ty, method.name);
        method
            .arguments
            .iter()
            .enumerate()
            .map(|(index, argument)| {
                self.injectee(argument, method.argument_annotations(index), &owner, reporter)
            })
            .collect()
    }

    fn injection_points(
        &mut self,
        class: &ClassMetadata,
        reporter: &mut dyn ErrorReporter,
    ) -> Vec<InjectionPoint> {
        let mut injection_points = vec![];

        for field in class
            .fields
            .iter()
            .filter(|field| has_annotation(&field.annotations, names::INJECT))
        {
            let owner = format!("{}.{}", class.ty, field.name);
            injection_points.push(InjectionPoint::Field {
                container_type: class.ty.clone(),
                field: field_descriptor(field),
                is_static: access::is_set(field.access, access::STATIC),
                injectee: self.injectee(&field.ty, &field.annotations, &owner, reporter),
            });
        }

        for method in class
            .methods
            .iter()
            .filter(|method| has_annotation(&method.annotations, names::INJECT))
        {
            injection_points.push(InjectionPoint::Method {
                container_type: class.ty.clone(),
                method: method_descriptor(method),
                is_static: access::is_set(method.access, access::STATIC),
                injectees: self.method_injectees(class, method, reporter),
            });
        }

        injection_points
    }

    // Registers constructor and binding provision points of a providable target in the modules
    // listed by @ProvidedBy.
    fn contribute_providers(
        &mut self,
        class: &ClassMetadata,
        constructors: &[InjectionPoint],
        reporter: &mut dyn ErrorReporter,
    ) {
        let Some(provided_by) = self.resolved_annotation(&class.annotations, names::PROVIDED_BY)
        else {
            return;
        };

        let modules = provided_by.types("value");
        if modules.is_empty() {
            return;
        }

        let Some(InjectionPoint::Method {
            method, injectees, ..
        }) = constructors.first()
        else {
            return;
        };

        let is_private = class
            .methods
            .iter()
            .find(|candidate| candidate.is_constructor() && method_descriptor(candidate) == *method)
            .map(|constructor| access::is_set(constructor.access, access::PRIVATE))
            .unwrap_or(false);

        let qualifier = self.qualifier(&class.annotations, &class.ty, reporter);
        let dependency = Dependency {
            ty: GenericType::Raw(class.ty.clone()),
            qualifier: qualifier.clone(),
        };
        let scope = Self::scope(&class.annotations);
        let bound_types = self
            .resolved_annotation(&class.annotations, names::PROVIDED_AS)
            .map(|provided_as| provided_as.types("value"))
            .unwrap_or_default();

        for module in modules {
            let providers = self.contributed_providers.entry(module.clone()).or_default();
            providers.push((
                ProvisionPoint::Constructor {
                    container_type: class.ty.clone(),
                    dependency: dependency.clone(),
                    method: method.clone(),
                    injectees: injectees.clone(),
                    bridge: is_private.then(|| {
                        MethodDescriptor::new(
                            "sabre$new",
                            method.arguments.clone(),
                            GenericType::Raw(class.ty.clone()),
                        )
                    }),
                },
                scope,
            ));

            for bound_type in &bound_types {
                providers.push((
                    ProvisionPoint::Binding {
                        container_type: module.clone(),
                        dependency: Dependency {
                            ty: GenericType::Raw(bound_type.clone()),
                            qualifier: qualifier.clone(),
                        },
                        binding: Injectee::new(dependency.clone(), Converter::Identity),
                    },
                    Scope::None,
                ));
            }
        }
    }

    fn components(
        &mut self,
        classes: &[ClassMetadata],
        reporter: &mut dyn ErrorReporter,
    ) -> Vec<Component> {
        let package_component = Type::object(names::PACKAGE_COMPONENT);
        let mut components = vec![];
        let mut root_components = vec![];

        for class in classes {
            let Some(annotation) = self.resolved_annotation(&class.annotations, names::COMPONENT)
            else {
                continue;
            };

            debug!("Found component {}", class.ty);

            if annotation.boolean("root").unwrap_or(false) {
                root_components.push(class.ty.clone());
            }

            let (default_module, _) = self.module(class, &mut vec![], reporter);
            components.push(Component {
                ty: class.ty.clone(),
                default_module,
                parent: None,
                subcomponents: annotation.types("subcomponents"),
            });
        }

        let mut parents = FxHashMap::default();
        for ty in &root_components {
            parents
                .entry(ty.clone())
                .or_insert_with(|| package_component.clone());
        }

        for component in &components {
            for subcomponent in &component.subcomponents {
                parents
                    .entry(subcomponent.clone())
                    .or_insert_with(|| component.ty.clone());
            }
        }

        for component in &mut components {
            component.parent = parents.get(&component.ty).cloned();
        }

        let mut result = Vec::with_capacity(components.len() + 1);
        result.push(Component {
            ty: package_component.clone(),
            default_module: Module::new(package_component, vec![], vec![]),
            parent: None,
            subcomponents: root_components,
        });
        result.extend(components);
        result
    }

    fn module_by_type(
        &mut self,
        ty: &Type,
        path: &mut Vec<Type>,
        reporter: &mut dyn ErrorReporter,
    ) -> Option<(Module, bool)> {
        if let Some(module) = self.modules.get(ty) {
            return Some((module.clone(), true));
        }

        match self.registry.class_metadata(ty) {
            Some(class) => Some(self.module(&class, path, reporter)),
            None => {
                warn!("Missing class metadata for module {}", ty);
                None
            }
        }
    }

    // Returns the module and whether all of its transitive imports are included. An import
    // closing a cycle is skipped, so such module is only valid for the current path.
    fn module(
        &mut self,
        class: &ClassMetadata,
        path: &mut Vec<Type>,
        reporter: &mut dyn ErrorReporter,
    ) -> (Module, bool) {
        if let Some(module) = self.modules.get(&class.ty) {
            return (module.clone(), true);
        }

        path.push(class.ty.clone());

        let mut provision_points = vec![];
        for field in class
            .fields
            .iter()
            .filter(|field| has_annotation(&field.annotations, names::PROVIDE))
        {
            let owner = format!("{}.{}", class.ty, field.name);
            let dependency = Dependency {
                ty: field.ty.clone(),
                qualifier: self.qualifier(&field.annotations, &owner, reporter),
            };

            provision_points.push((
                ProvisionPoint::Field {
                    container_type: class.ty.clone(),
                    dependency,
                    field: field_descriptor(field),
                    bridge: access::is_set(field.access, access::PRIVATE).then(|| {
                        MethodDescriptor::new(
                            format!("sabre$get${}", field.name),
                            vec![],
                            field.ty.clone(),
                        )
                    }),
                },
                Self::scope(&field.annotations),
            ));
        }

        for method in class
            .methods
            .iter()
            .filter(|method| has_annotation(&method.annotations, names::PROVIDE))
        {
            let owner = format!("{}.{}", class.ty, method.name);
            let dependency = Dependency {
                ty: method.return_type.clone(),
                qualifier: self.qualifier(&method.annotations, &owner, reporter),
            };
            let descriptor = method_descriptor(method);

            provision_points.push((
                ProvisionPoint::Method {
                    container_type: class.ty.clone(),
                    dependency,
                    injectees: self.method_injectees(class, method, reporter),
                    bridge: access::is_set(method.access, access::PRIVATE).then(|| {
                        MethodDescriptor::new(
                            format!("sabre$bridge${}", method.name),
                            descriptor.arguments.clone(),
                            descriptor.return_type.clone(),
                        )
                    }),
                    method: descriptor,
                },
                Self::scope(&method.annotations),
            ));
        }

        provision_points.extend(
            self.contributed_providers
                .get(&class.ty)
                .cloned()
                .unwrap_or_default(),
        );

        let providers = provision_points
            .into_iter()
            .enumerate()
            .map(|(index, (provision_point, scope))| Provider {
                provider_type: Type::object(format!("{}{PROVIDER_INFIX}{index}", class.ty)),
                module_type: class.ty.clone(),
                provision_point,
                scope,
            })
            .collect();

        let mut imported_modules = vec![];
        let mut imported_types = FxHashSet::default();
        let mut complete = true;
        let imports = self
            .resolved_annotation(&class.annotations, names::IMPORT)
            .map(|import| import.types("value"))
            .unwrap_or_default();

        for imported_type in imports {
            if !imported_types.insert(imported_type.clone()) {
                continue;
            }

            if path.contains(&imported_type) {
                warn!(
                    "Module {} imports {}, which is already being imported - ignoring",
                    class.ty, imported_type
                );
                complete = false;
                continue;
            }

            if let Some((module, module_complete)) =
                self.module_by_type(&imported_type, path, reporter)
            {
                imported_modules.push(module);
                complete &= module_complete;
            }
        }

        path.pop();

        let module = Module::new(class.ty.clone(), providers, imported_modules);
        if complete {
            self.modules.insert(class.ty.clone(), module.clone());
        }

        (module, complete)
    }
}

fn has_annotation(annotations: &[AnnotationData], name: &str) -> bool {
    annotations
        .iter()
        .any(|annotation| annotation.ty.internal_name() == Some(name))
}

fn field_descriptor(field: &FieldMetadata) -> FieldDescriptor {
    FieldDescriptor {
        name: field.name.clone(),
        ty: field.ty.clone(),
    }
}

fn method_descriptor(method: &MethodMetadata) -> MethodDescriptor {
    MethodDescriptor {
        name: method.name.clone(),
        arguments: method.arguments.clone(),
        return_type: method.return_type.clone(),
    }
}
