//! Validation of the whole [InjectionContext] before any code gets generated.
//!
//! Validation runs a fixed sequence of passes:
//!
//! 1. sanity checks of the model - static injection, non-constructable providable targets,
//! providers of `void` and ambiguous constructors
//! 2. cycles in the component hierarchy, which must form a tree
//! 3. per-lineage [injection graphs](injection_graph) - duplicated modules and dependencies,
//! unresolved dependencies and dependency cycles
//! 4. components which are not reachable from the root component
//! 5. requirements of member injection targets which no module provides
//!
//! No pass stops validation - every problem is reported to the [ErrorReporter], and the caller
//! decides about failure afterwards. The same problem found through multiple lineages is reported
//! once.

pub mod injection_graph;
pub mod sanity;

use crate::error::{ErrorPtr, ErrorReporter, ProcessingError};
use crate::graph::DirectedGraph;
use crate::metadata::ClassRegistry;
use crate::model::{Component, Dependency, InjectionContext, InjectionPoint};
use crate::resolver::{DependencyGraphBuilder, DependencyResolver};
use crate::validator::injection_graph::{
    build_injection_graphs, components, InjectionGraph, InjectionGraphVertex,
};
use fxhash::FxHashSet;
use itertools::Itertools;
use tracing::{debug, info};

/// Validation options.
#[derive(Clone, Copy, Default, Eq, PartialEq, Debug)]
pub struct ValidatorConfig {
    /// Don't require dependencies injected through a provider or lazy handle to be resolvable.
    pub omit_wrapped_dependencies: bool,
}

/// Validator for [InjectionContext]s. See module documentation for the list of checks.
#[derive(Clone, Copy, Default, Debug)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn validate(
        &self,
        context: &InjectionContext,
        registry: &dyn ClassRegistry,
        reporter: &mut dyn ErrorReporter,
    ) {
        let mut reporter = DistinctErrorReporter::new(reporter);

        info!("Running sanity checks...");
        sanity::check(context, registry, &mut reporter);

        info!("Validating component hierarchy...");
        self.check_component_cycles(context, &mut reporter);

        info!("Validating injection graphs...");
        let graphs = build_injection_graphs(context);
        for graph in &graphs {
            self.check_injection_graph(context, graph, &mut reporter);
        }

        self.check_abandoned_components(context, &graphs, &mut reporter);

        info!("Validating member injection targets...");
        self.check_injectable_targets(context, &mut reporter);
    }

    fn check_component_cycles(&self, context: &InjectionContext, reporter: &mut dyn ErrorReporter) {
        let mut graph = DirectedGraph::new();
        for component in context.components() {
            graph.put_edges(component.ty.clone(), component.subcomponents.iter().cloned());
        }

        for cycle in graph.find_cycles() {
            reporter.report_error(ProcessingError::CycledComponent(
                cycle.iter().join(" -> "),
            ));
        }
    }

    fn check_injection_graph(
        &self,
        context: &InjectionContext,
        graph: &InjectionGraph,
        reporter: &mut dyn ErrorReporter,
    ) {
        let components = components(graph, context);
        debug!(
            "Validating injection graph of {}",
            components.iter().map(|component| &component.ty).join(" -> ")
        );

        check_duplicates(graph, reporter);

        let mut builder = DependencyGraphBuilder::new(self.config.omit_wrapped_dependencies);
        builder.add_modules(components.iter().map(|component| &component.default_module));

        for dependency in builder.build().unresolved_dependencies() {
            reporter.report_error(ProcessingError::UnresolvedDependency {
                component: requiring_component(&components, &dependency, self.config)
                    .map(|component| component.ty.clone())
                    .unwrap_or_else(|| context.root_component_type().clone()),
                dependency: dependency.to_string(),
            });
        }

        // a provider or lazy handle breaks a construction cycle
        let mut builder = DependencyGraphBuilder::new(true);
        builder.add_modules(components.iter().map(|component| &component.default_module));

        for cycle in builder.build().cycles() {
            reporter.report_error(ProcessingError::CycledDependency(
                cycle.iter().join(" -> "),
            ));
        }
    }

    fn check_abandoned_components(
        &self,
        context: &InjectionContext,
        graphs: &[InjectionGraph],
        reporter: &mut dyn ErrorReporter,
    ) {
        let mut merged = InjectionGraph::new();
        for graph in graphs {
            merged.extend(graph);
        }

        for component in context
            .components()
            .iter()
            .filter(|component| component.ty != *context.root_component_type())
            .filter(|component| {
                !merged.contains_vertex(&InjectionGraphVertex::Component(component.ty.clone()))
            })
        {
            reporter.report_error(ProcessingError::AbandonedComponent(component.ty.clone()));
        }
    }

    fn check_injectable_targets(&self, context: &InjectionContext, reporter: &mut dyn ErrorReporter) {
        let mut module_resolver = DependencyResolver::new(self.config.omit_wrapped_dependencies);
        for component in context.components() {
            module_resolver.add_module(&component.default_module);
        }

        for target in context.injectable_targets() {
            let mut resolver = module_resolver.clone();
            resolver.add_injection_target(target);

            for dependency in resolver
                .unresolved_dependencies()
                .into_iter()
                .filter(|dependency| is_required_by_target(target.injection_points(), dependency))
            {
                reporter.report_error(ProcessingError::UnresolvedMemberDependency {
                    dependency: dependency.to_string(),
                    target: target.ty().clone(),
                });
            }
        }
    }
}

fn is_required_by_target(injection_points: &[InjectionPoint], dependency: &Dependency) -> bool {
    injection_points
        .iter()
        .flat_map(|injection_point| injection_point.injectees())
        .any(|injectee| injectee.dependency.boxed() == *dependency)
}

fn check_duplicates(graph: &InjectionGraph, reporter: &mut dyn ErrorReporter) {
    let reversed = graph.reversed();

    for vertex in reversed.vertices() {
        match vertex {
            InjectionGraphVertex::Module(module) => {
                let providers = reversed
                    .adjacent_vertices(vertex)
                    .filter(|provider| {
                        matches!(
                            provider,
                            InjectionGraphVertex::Component(_) | InjectionGraphVertex::Module(_)
                        )
                    })
                    .map(|provider| provider.to_string())
                    .collect::<Vec<_>>();

                if providers.len() > 1 {
                    reporter.report_error(ProcessingError::ModuleProvidedMultipleTimes {
                        module: module.clone(),
                        providers,
                    });
                }
            }
            InjectionGraphVertex::Dependency(dependency) => {
                let modules = reversed
                    .adjacent_vertices(vertex)
                    .filter_map(|provider| match provider {
                        InjectionGraphVertex::Module(module) => Some(module.clone()),
                        _ => None,
                    })
                    .collect::<Vec<_>>();

                if modules.len() > 1 {
                    reporter.report_error(ProcessingError::DependencyProvidedMultipleTimes {
                        dependency: dependency.to_string(),
                        modules,
                    });
                }
            }
            InjectionGraphVertex::Component(_) => {}
        }
    }
}

// The component closest to the root whose modules need given dependency.
fn requiring_component<'a>(
    components: &[&'a Component],
    dependency: &Dependency,
    config: ValidatorConfig,
) -> Option<&'a Component> {
    components.iter().copied().find(|component| {
        let mut resolver = DependencyResolver::new(config.omit_wrapped_dependencies);
        resolver.add_module(&component.default_module);
        resolver.required_dependencies().contains(dependency)
    })
}

// Reports each distinct error once.
struct DistinctErrorReporter<'a> {
    reporter: &'a mut dyn ErrorReporter,
    reported: FxHashSet<ProcessingError>,
}

impl<'a> DistinctErrorReporter<'a> {
    fn new(reporter: &'a mut dyn ErrorReporter) -> Self {
        Self {
            reporter,
            reported: Default::default(),
        }
    }
}

impl ErrorReporter for DistinctErrorReporter<'_> {
    fn report_error(&mut self, error: ProcessingError) {
        if self.reported.insert(error.clone()) {
            self.reporter.report_error(error);
        }
    }

    fn report_error_with_cause(&mut self, error: ProcessingError, cause: ErrorPtr) {
        if self.reported.insert(error.clone()) {
            self.reporter.report_error_with_cause(error, cause);
        }
    }

    #[inline]
    fn has_errors(&self) -> bool {
        self.reporter.has_errors()
    }
}
