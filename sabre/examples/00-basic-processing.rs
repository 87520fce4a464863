use sabre::processor::Processor;
use sabre_di::analyzer::names;
use sabre_di::annotation::{AnnotationData, AnnotationValue};
use sabre_di::metadata::{access, ClassMetadata, InMemoryClassRegistry, MethodMetadata};
use sabre_di::types::{GenericType, Type};

fn marker(name: &str) -> AnnotationData {
    AnnotationData::marker(Type::object(name))
}

// class metadata normally comes from a class file reader; here it's written by hand
fn registry() -> InMemoryClassRegistry {
    let component = ClassMetadata {
        ty: Type::object("app/AppComponent"),
        access: access::PUBLIC,
        super_type: Some(Type::object("java/lang/Object")),
        interfaces: vec![],
        fields: vec![],
        methods: vec![MethodMetadata {
            name: "provideGreeting".to_string(),
            access: access::PUBLIC,
            arguments: vec![],
            return_type: GenericType::object("java/lang/String"),
            annotations: vec![marker(names::PROVIDE)],
            parameter_annotations: vec![],
            default_value: None,
        }],
        // root components become children of the implicit package component
        annotations: vec![AnnotationData::new(
            Type::object(names::COMPONENT),
            [("root".to_string(), AnnotationValue::Boolean(true))]
                .into_iter()
                .collect(),
        )],
    };

    [component].into_iter().collect()
}

// note: for the sake of simplicity, errors are unwrapped, rather than gracefully handled
fn main() {
    // the config is read from sabre.json and SABRE_ environment variables
    let processor = Processor::from_environment().expect("unable to read configuration");

    let context = processor
        .process(&registry())
        .expect("processing failed");

    for component in context.components() {
        println!(
            "{} provides {} dependencies",
            component.ty,
            component.default_module.providers.len()
        );
    }
}
