//! Dependency resolution over sets of modules.
//!
//! [DependencyGraphBuilder] produces a graph from each provided dependency to the dependencies
//! needed to provide it, which allows finding both missing dependencies and cycles.
//! [DependencyResolver] is a lighter, set-based variant answering only what is missing.
//!
//! Both normalize dependencies by boxing their types, so a provider of `int` satisfies a
//! requirement for `java/lang/Integer`. When `omit_wrapped_dependencies` is enabled, requirements
//! asking for a provider or lazy handle are not considered, since they can be satisfied later than
//! the value which needs them.

use crate::graph::DirectedGraph;
use crate::model::{Dependency, InjectionTarget, Injectee, Module};
use crate::types::{GenericType, Type};
use fxhash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Type of the injector, which can always be injected.
pub const INJECTOR_TYPE: &str = "sabre/Injector";

/// The dependency representing the injector itself.
pub fn injector_dependency() -> Dependency {
    Dependency::new(GenericType::object(INJECTOR_TYPE))
}

/// A dependency provided by more than one provider.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DuplicateProvision {
    pub dependency: Dependency,
    /// Modules declaring the providers, in declaration order.
    pub modules: Vec<Type>,
}

/// Result of [DependencyGraphBuilder::build].
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    /// Edges go from a provided dependency to its requirements.
    pub graph: DirectedGraph<Dependency>,
    /// Dependencies provided more than once within the added modules. Informational only;
    /// validation reports duplicates from injection graph fan-in instead.
    pub duplicates: Vec<DuplicateProvision>,
}

impl DependencyGraph {
    /// Required dependencies without any provider.
    #[inline]
    pub fn unresolved_dependencies(&self) -> Vec<Dependency> {
        self.graph.find_missing_vertices()
    }

    /// Provision cycles, each starting and ending with the same dependency.
    #[inline]
    pub fn cycles(&self) -> Vec<Vec<Dependency>> {
        self.graph.find_cycles()
    }
}

/// Builder for [DependencyGraph]s.
#[derive(Clone, Debug)]
pub struct DependencyGraphBuilder {
    omit_wrapped_dependencies: bool,
    graph: DirectedGraph<Dependency>,
    providers: FxHashMap<Dependency, Vec<Type>>,
}

impl DependencyGraphBuilder {
    pub fn new(omit_wrapped_dependencies: bool) -> Self {
        let mut graph = DirectedGraph::new();
        graph.put_vertex(injector_dependency());

        Self {
            omit_wrapped_dependencies,
            graph,
            providers: Default::default(),
        }
    }

    /// Adds providers of the module and all modules it imports.
    pub fn add_module(&mut self, module: &Module) -> &mut Self {
        for module in module.flatten() {
            debug!("Adding module {} to dependency graph", module.ty);

            for provider in &module.providers {
                let dependency = provider.dependency().boxed();
                self.providers
                    .entry(dependency.clone())
                    .or_default()
                    .push(module.ty.clone());

                let requirements = required_dependencies(
                    provider.provision_point.injectees(),
                    self.omit_wrapped_dependencies,
                );
                self.graph.put_edges(dependency, requirements);
            }
        }

        self
    }

    pub fn add_modules<'a, I: IntoIterator<Item = &'a Module>>(&mut self, modules: I) -> &mut Self {
        for module in modules {
            self.add_module(module);
        }

        self
    }

    pub fn build(self) -> DependencyGraph {
        let duplicates = self
            .graph
            .vertices()
            .filter_map(|dependency| {
                self.providers
                    .get(dependency)
                    .filter(|modules| modules.len() > 1)
                    .map(|modules| DuplicateProvision {
                        dependency: dependency.clone(),
                        modules: modules.clone(),
                    })
            })
            .collect();

        DependencyGraph {
            graph: self.graph,
            duplicates,
        }
    }
}

/// Set-based resolution of provided and required dependencies.
#[derive(Clone, Debug)]
pub struct DependencyResolver {
    omit_wrapped_dependencies: bool,
    provided_dependencies: FxHashSet<Dependency>,
    required_dependencies: FxHashSet<Dependency>,
    // first requirement order, for stable reporting
    required_order: Vec<Dependency>,
}

impl DependencyResolver {
    pub fn new(omit_wrapped_dependencies: bool) -> Self {
        Self {
            omit_wrapped_dependencies,
            provided_dependencies: [injector_dependency()].into_iter().collect(),
            required_dependencies: Default::default(),
            required_order: vec![],
        }
    }

    /// Adds providers of the module and all modules it imports.
    pub fn add_module(&mut self, module: &Module) -> &mut Self {
        for module in module.flatten() {
            for provider in &module.providers {
                self.provided_dependencies
                    .insert(provider.dependency().boxed());
                self.add_requirements(provider.provision_point.injectees());
            }
        }

        self
    }

    /// Adds requirements of all injection points of the target.
    pub fn add_injection_target(&mut self, target: &InjectionTarget) -> &mut Self {
        for injection_point in target.injection_points() {
            self.add_requirements(injection_point.injectees());
        }

        self
    }

    fn add_requirements(&mut self, injectees: &[Injectee]) {
        for dependency in required_dependencies(injectees, self.omit_wrapped_dependencies) {
            if self.required_dependencies.insert(dependency.clone()) {
                self.required_order.push(dependency);
            }
        }
    }

    #[inline]
    pub fn provided_dependencies(&self) -> &FxHashSet<Dependency> {
        &self.provided_dependencies
    }

    #[inline]
    pub fn required_dependencies(&self) -> &FxHashSet<Dependency> {
        &self.required_dependencies
    }

    /// Required dependencies without a provider, in order of first requirement.
    pub fn unresolved_dependencies(&self) -> Vec<Dependency> {
        self.required_order
            .iter()
            .filter(|dependency| !self.provided_dependencies.contains(*dependency))
            .cloned()
            .collect()
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.required_dependencies
            .iter()
            .all(|dependency| self.provided_dependencies.contains(dependency))
    }
}

fn required_dependencies(
    injectees: &[Injectee],
    omit_wrapped_dependencies: bool,
) -> impl Iterator<Item = Dependency> + '_ {
    injectees
        .iter()
        .filter(move |injectee| !omit_wrapped_dependencies || injectee.converter.is_identity())
        .map(|injectee| injectee.dependency.boxed())
}
