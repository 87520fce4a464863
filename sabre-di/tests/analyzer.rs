mod analyzer_test {
    use sabre_di::analyzer::{names, Analyzer};
    use sabre_di::annotation::{AnnotationData, AnnotationValue};
    use sabre_di::metadata::{
        access, ClassMetadata, FieldMetadata, InMemoryClassRegistry, MethodMetadata,
        CONSTRUCTOR_NAME,
    };
    use sabre_di::model::{Converter, InjectionContext, InjectionPoint, ProvisionPoint, Scope};
    use sabre_di::types::{GenericType, Type};
    use sabre_di::validator::{Validator, ValidatorConfig};
    use sabre_di::{CollectingErrorReporter, ProcessingError};

    fn marker(name: &str) -> AnnotationData {
        AnnotationData::marker(Type::object(name))
    }

    fn annotation(name: &str, values: Vec<(&str, AnnotationValue)>) -> AnnotationData {
        AnnotationData::new(
            Type::object(name),
            values
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    }

    fn types(type_names: &[&str]) -> AnnotationValue {
        AnnotationValue::Array(
            type_names
                .iter()
                .map(|type_name| AnnotationValue::Type(Type::object(type_name)))
                .collect(),
        )
    }

    fn class(name: &str, annotations: Vec<AnnotationData>) -> ClassMetadata {
        ClassMetadata {
            ty: Type::object(name),
            access: access::PUBLIC,
            super_type: Some(Type::object("java/lang/Object")),
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
            annotations,
        }
    }

    fn qualifier_class(name: &str) -> ClassMetadata {
        ClassMetadata {
            access: access::PUBLIC | access::INTERFACE | access::ABSTRACT | access::ANNOTATION,
            ..class(name, vec![marker(names::QUALIFIER)])
        }
    }

    fn field(
        name: &str,
        access: u16,
        ty: GenericType,
        annotations: Vec<AnnotationData>,
    ) -> FieldMetadata {
        FieldMetadata {
            name: name.to_string(),
            access,
            ty,
            annotations,
        }
    }

    fn method(
        name: &str,
        access: u16,
        arguments: Vec<GenericType>,
        return_type: GenericType,
        annotations: Vec<AnnotationData>,
    ) -> MethodMetadata {
        MethodMetadata {
            name: name.to_string(),
            access,
            arguments,
            return_type,
            annotations,
            parameter_annotations: vec![],
            default_value: None,
        }
    }

    fn analyze(registry: &InMemoryClassRegistry) -> (InjectionContext, Vec<ProcessingError>) {
        let mut reporter = CollectingErrorReporter::default();
        let context = Analyzer::new(registry).analyze(&mut reporter);
        Validator::new(ValidatorConfig::default()).validate(&context, registry, &mut reporter);

        let errors = reporter
            .into_errors()
            .into_iter()
            .map(|error| error.error)
            .collect();

        (context, errors)
    }

    fn application() -> InMemoryClassRegistry {
        let mut network_module = class("test/NetworkModule", vec![marker(names::MODULE)]);
        network_module.fields.push(field(
            "config",
            access::PRIVATE,
            GenericType::object("test/Config"),
            vec![marker(names::PROVIDE)],
        ));
        network_module.methods.push(method(
            "provideClient",
            access::PUBLIC,
            vec![GenericType::object("test/Config")],
            GenericType::object("test/Client"),
            vec![marker(names::PROVIDE), marker(names::SINGLETON)],
        ));

        let mut service = class(
            "test/Service",
            vec![
                annotation(names::PROVIDED_BY, vec![("value", types(&["test/NetworkModule"]))]),
                annotation(names::PROVIDED_AS, vec![("value", types(&["test/ServiceApi"]))]),
                marker(names::SINGLETON),
            ],
        );
        service.methods.push(method(
            CONSTRUCTOR_NAME,
            access::PRIVATE,
            vec![GenericType::object("test/Client")],
            GenericType::Raw(Type::Void),
            vec![marker(names::INJECT)],
        ));

        let mut activity = class("test/Activity", vec![]);
        activity.fields.push(field(
            "service",
            access::PRIVATE,
            GenericType::parameterized(names::PROVIDER, vec![GenericType::object("test/ServiceApi")]),
            vec![marker(names::INJECT)],
        ));

        [
            class(
                "test/AppComponent",
                vec![
                    annotation(names::COMPONENT, vec![("root", AnnotationValue::Boolean(true))]),
                    annotation(names::IMPORT, vec![("value", types(&["test/NetworkModule"]))]),
                ],
            ),
            network_module,
            service,
            activity,
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn should_analyze_valid_application() {
        let (context, errors) = analyze(&application());
        assert!(errors.is_empty(), "{errors:?}");

        let package_component = Type::object(names::PACKAGE_COMPONENT);
        assert_eq!(*context.root_component_type(), package_component);
        assert_eq!(
            context.root_component().unwrap().subcomponents,
            vec![Type::object("test/AppComponent")]
        );

        let app_component = context
            .find_component(&Type::object("test/AppComponent"))
            .unwrap();
        assert_eq!(app_component.parent, Some(package_component));
        assert_eq!(app_component.default_module.modules.len(), 1);

        let network_module = &app_component.default_module.modules[0];
        assert_eq!(network_module.ty, Type::object("test/NetworkModule"));
        assert_eq!(
            network_module
                .providers
                .iter()
                .map(|provider| provider.dependency().to_string())
                .collect::<Vec<_>>(),
            vec!["test/Config", "test/Client", "test/Service", "test/ServiceApi"]
        );
        assert_eq!(
            network_module.providers[3].provider_type,
            Type::object("test/NetworkModule$SabreProvider$3")
        );
    }

    #[test]
    fn should_analyze_provision_points() {
        let (context, _) = analyze(&application());
        let network_module = &context
            .find_component(&Type::object("test/AppComponent"))
            .unwrap()
            .default_module
            .modules[0];

        let providers = &network_module.providers;
        assert_eq!(
            providers[0]
                .provision_point
                .bridge()
                .map(|bridge| bridge.name.as_str()),
            Some("sabre$get$config")
        );
        assert!(providers[1].provision_point.bridge().is_none());
        assert_eq!(providers[1].scope, Scope::Singleton);

        assert!(matches!(
            &providers[2].provision_point,
            ProvisionPoint::Constructor { bridge: Some(bridge), .. } if bridge.name == "sabre$new"
        ));
        assert_eq!(providers[2].scope, Scope::Singleton);

        match &providers[3].provision_point {
            ProvisionPoint::Binding { binding, .. } => {
                assert_eq!(binding.dependency.to_string(), "test/Service")
            }
            other => panic!("Unexpected provision point: {other:?}"),
        }
    }

    #[test]
    fn should_find_injection_targets() {
        let (context, _) = analyze(&application());

        let activity = context
            .find_injectable_target(&Type::object("test/Activity"))
            .unwrap();
        match &activity.injection_points()[0] {
            InjectionPoint::Field { injectee, .. } => {
                assert_eq!(injectee.converter, Converter::Provider);
                assert_eq!(injectee.dependency.ty, GenericType::object("test/ServiceApi"));
            }
            other => panic!("Unexpected injection point: {other:?}"),
        }

        assert!(context
            .find_providable_target(&Type::object("test/Service"))
            .is_some());
        assert!(context
            .find_injectable_target(&Type::object("test/Service"))
            .is_none());
    }

    #[test]
    fn should_resolve_custom_qualifiers() {
        let mut component = class(
            "test/ColorComponent",
            vec![annotation(
                names::COMPONENT,
                vec![("root", AnnotationValue::Boolean(true))],
            )],
        );
        component.methods.push(method(
            "provideBlue",
            access::PUBLIC,
            vec![],
            GenericType::object("java/lang/String"),
            vec![marker(names::PROVIDE), marker("test/Blue")],
        ));
        component.methods.push(method(
            "provideRed",
            access::PUBLIC,
            vec![],
            GenericType::object("java/lang/String"),
            vec![
                marker(names::PROVIDE),
                annotation(
                    names::NAMED,
                    vec![("value", AnnotationValue::String("red".to_string()))],
                ),
            ],
        ));

        let mut consumer = class("test/Consumer", vec![]);
        let mut setter = method(
            "setColor",
            access::PUBLIC,
            vec![GenericType::object("java/lang/String")],
            GenericType::Raw(Type::Void),
            vec![marker(names::INJECT)],
        );
        setter.parameter_annotations = vec![vec![marker("test/Blue")]];
        consumer.methods.push(setter);

        let registry = [qualifier_class("test/Blue"), component, consumer]
            .into_iter()
            .collect();
        let (context, errors) = analyze(&registry);
        assert!(errors.is_empty(), "{errors:?}");

        let consumer = context
            .find_injectable_target(&Type::object("test/Consumer"))
            .unwrap();
        let qualifier = consumer.injection_points()[0].injectees()[0]
            .dependency
            .qualifier
            .clone()
            .unwrap();
        assert_eq!(qualifier.ty, Type::object("test/Blue"));
        assert!(qualifier.resolved);
    }

    #[test]
    fn should_report_unresolved_qualifier_once() {
        let blue = || {
            annotation(
                "test/Blue",
                vec![(
                    "shade",
                    AnnotationValue::Annotation(marker("test/Unknown")),
                )],
            )
        };

        let mut component = class(
            "test/AppComponent",
            vec![annotation(
                names::COMPONENT,
                vec![("root", AnnotationValue::Boolean(true))],
            )],
        );
        component.methods.push(method(
            "provideValue",
            access::PUBLIC,
            vec![],
            GenericType::object("java/lang/String"),
            vec![marker(names::PROVIDE), blue()],
        ));

        let mut consumer = method(
            "provideConsumer",
            access::PUBLIC,
            vec![GenericType::object("java/lang/String")],
            GenericType::object("test/Consumer"),
            vec![marker(names::PROVIDE)],
        );
        consumer.parameter_annotations = vec![vec![blue()]];
        component.methods.push(consumer);

        let registry = [qualifier_class("test/Blue"), component]
            .into_iter()
            .collect();
        let (_, errors) = analyze(&registry);

        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(matches!(
            &errors[0],
            ProcessingError::UnresolvedAnnotation(annotation) if annotation.starts_with("@test/Blue")
        ));
    }

    #[test]
    fn should_assign_subcomponent_parents() {
        let registry = [
            class(
                "test/Parent",
                vec![annotation(
                    names::COMPONENT,
                    vec![
                        ("root", AnnotationValue::Boolean(true)),
                        ("subcomponents", types(&["test/Child"])),
                    ],
                )],
            ),
            class("test/Child", vec![marker(names::COMPONENT)]),
            class("test/Orphan", vec![marker(names::COMPONENT)]),
        ]
        .into_iter()
        .collect();

        let (context, errors) = analyze(&registry);

        assert_eq!(
            context
                .find_component(&Type::object("test/Child"))
                .unwrap()
                .parent,
            Some(Type::object("test/Parent"))
        );
        assert_eq!(
            errors,
            vec![ProcessingError::AbandonedComponent(Type::object(
                "test/Orphan"
            ))]
        );
    }

    #[test]
    fn should_report_static_injection() {
        let mut target = class("test/Target", vec![]);
        target.fields.push(field(
            "instance",
            access::PUBLIC | access::STATIC,
            GenericType::object("test/Target"),
            vec![marker(names::INJECT)],
        ));

        let registry = [target].into_iter().collect();
        let (_, errors) = analyze(&registry);

        assert!(errors.contains(&ProcessingError::StaticInjection {
            container_type: Type::object("test/Target"),
            member: "instance".to_string(),
        }));
    }

    #[test]
    fn should_unwrap_lazy_dependencies() {
        let mut component = class(
            "test/AppComponent",
            vec![annotation(
                names::COMPONENT,
                vec![("root", AnnotationValue::Boolean(true))],
            )],
        );
        component.methods.push(method(
            "provideA",
            access::PUBLIC,
            vec![GenericType::parameterized(
                names::LAZY,
                vec![GenericType::object("test/B")],
            )],
            GenericType::object("test/A"),
            vec![marker(names::PROVIDE)],
        ));
        component.methods.push(method(
            "provideB",
            access::PUBLIC,
            vec![GenericType::object("test/A")],
            GenericType::object("test/B"),
            vec![marker(names::PROVIDE)],
        ));

        let registry = [component].into_iter().collect();
        let (context, errors) = analyze(&registry);
        assert!(errors.is_empty(), "{errors:?}");

        let provider = &context
            .find_component(&Type::object("test/AppComponent"))
            .unwrap()
            .default_module
            .providers[0];
        let injectee = &provider.provision_point.injectees()[0];
        assert_eq!(injectee.converter, Converter::Lazy);
        assert_eq!(injectee.dependency.ty, GenericType::object("test/B"));
    }

    #[test]
    fn should_match_empty_name_with_default_name() {
        let string = GenericType::object("java/lang/String");
        let mut component = class(
            "test/AppComponent",
            vec![annotation(
                names::COMPONENT,
                vec![("root", AnnotationValue::Boolean(true))],
            )],
        );
        component.fields.push(field(
            "name",
            access::PUBLIC,
            string.clone(),
            vec![
                marker(names::PROVIDE),
                annotation(
                    names::NAMED,
                    vec![("value", AnnotationValue::String(String::new()))],
                ),
            ],
        ));

        let mut greeter = method(
            "provideGreeter",
            access::PUBLIC,
            vec![string],
            GenericType::object("test/Greeter"),
            vec![marker(names::PROVIDE)],
        );
        greeter.parameter_annotations = vec![vec![marker(names::NAMED)]];
        component.methods.push(greeter);

        let registry = [component].into_iter().collect();
        let (_, errors) = analyze(&registry);

        assert!(errors.is_empty(), "{errors:?}");
    }

    fn cyclic_imports(component_first: bool) -> InMemoryClassRegistry {
        let root = || ("root", AnnotationValue::Boolean(true));

        let mut module_a = class(
            "test/ModuleA",
            vec![
                marker(names::MODULE),
                annotation(names::IMPORT, vec![("value", types(&["test/ModuleB"]))]),
            ],
        );
        module_a.methods.push(method(
            "provideX",
            access::PUBLIC,
            vec![],
            GenericType::object("test/X"),
            vec![marker(names::PROVIDE)],
        ));

        let module_b = class(
            "test/ModuleB",
            vec![
                marker(names::MODULE),
                annotation(names::IMPORT, vec![("value", types(&["test/ModuleA"]))]),
            ],
        );

        let first = class(
            "test/FirstComponent",
            vec![
                annotation(names::COMPONENT, vec![root()]),
                annotation(names::IMPORT, vec![("value", types(&["test/ModuleA"]))]),
            ],
        );

        let mut second = class(
            "test/SecondComponent",
            vec![
                annotation(names::COMPONENT, vec![root()]),
                annotation(names::IMPORT, vec![("value", types(&["test/ModuleB"]))]),
            ],
        );
        second.methods.push(method(
            "provideY",
            access::PUBLIC,
            vec![GenericType::object("test/X")],
            GenericType::object("test/Y"),
            vec![marker(names::PROVIDE)],
        ));

        let mut classes = vec![first, module_a, module_b, second];
        if !component_first {
            classes.reverse();
        }

        classes.into_iter().collect()
    }

    #[test]
    fn should_resolve_cyclic_imports_regardless_of_order() {
        for component_first in [true, false] {
            let (context, errors) = analyze(&cyclic_imports(component_first));
            assert!(errors.is_empty(), "{errors:?}");

            let second = context
                .find_component(&Type::object("test/SecondComponent"))
                .unwrap();
            assert_eq!(
                second
                    .default_module
                    .flatten()
                    .into_iter()
                    .map(|module| module.ty.to_string())
                    .collect::<Vec<_>>(),
                vec!["test/SecondComponent", "test/ModuleB", "test/ModuleA"]
            );
        }
    }
}
