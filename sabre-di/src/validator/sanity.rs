//! Structural checks of the model which don't need any graphs.

use crate::error::{ErrorReporter, ProcessingError};
use crate::metadata::{access, ClassRegistry};
use crate::model::InjectionContext;
use fxhash::FxHashSet;
use tracing::warn;

pub fn check(
    context: &InjectionContext,
    registry: &dyn ClassRegistry,
    reporter: &mut dyn ErrorReporter,
) {
    check_static_injection_points(context, reporter);
    check_providable_targets(context, registry, reporter);
    check_provided_types(context, reporter);
}

fn check_static_injection_points(context: &InjectionContext, reporter: &mut dyn ErrorReporter) {
    for injection_point in context
        .injectable_targets()
        .iter()
        .chain(context.providable_targets())
        .flat_map(|target| target.injection_points())
        .filter(|injection_point| injection_point.is_static())
    {
        reporter.report_error(ProcessingError::StaticInjection {
            container_type: injection_point.container_type().clone(),
            member: injection_point.member_name().to_string(),
        });
    }
}

fn check_providable_targets(
    context: &InjectionContext,
    registry: &dyn ClassRegistry,
    reporter: &mut dyn ErrorReporter,
) {
    for target in context.providable_targets() {
        match registry.class_metadata(target.ty()) {
            Some(metadata) if access::is_set(metadata.access, access::NON_CONSTRUCTABLE) => {
                reporter.report_error(ProcessingError::NotConstructable(target.ty().clone()));
            }
            Some(_) => {}
            None => warn!(
                "Missing class metadata for providable target {}",
                target.ty()
            ),
        }

        if target.constructors().count() > 1 {
            reporter.report_error(ProcessingError::MultipleInjectableConstructors(
                target.ty().clone(),
            ));
        }
    }
}

fn check_provided_types(context: &InjectionContext, reporter: &mut dyn ErrorReporter) {
    let mut checked_modules = FxHashSet::default();

    for module in context
        .components()
        .iter()
        .flat_map(|component| component.default_module.flatten())
    {
        if !checked_modules.insert(&module.ty) {
            continue;
        }

        for provider in module
            .providers
            .iter()
            .filter(|provider| provider.dependency().ty.is_void())
        {
            reporter.report_error(ProcessingError::VoidProvider {
                module_type: module.ty.clone(),
                member: provider.provision_point.member_name().to_string(),
            });
        }
    }
}
