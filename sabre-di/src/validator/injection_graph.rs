//! Injection graphs describe a single lineage of components: each graph follows one path from the
//! root component down to a leaf subcomponent, with edges from components to their modules, from
//! modules to imported modules and from modules to the dependencies they provide. Everything in a
//! single graph is visible to the leaf component, so anything provided twice in a graph is
//! ambiguous.

use crate::graph::DirectedGraph;
use crate::model::{Component, Dependency, InjectionContext, Module};
use crate::types::Type;
use std::fmt::{Display, Formatter};
use tracing::{debug, warn};

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum InjectionGraphVertex {
    Component(Type),
    Module(Type),
    Dependency(Dependency),
}

impl Display for InjectionGraphVertex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InjectionGraphVertex::Component(ty) => write!(f, "component {ty}"),
            InjectionGraphVertex::Module(ty) => write!(f, "module {ty}"),
            InjectionGraphVertex::Dependency(dependency) => write!(f, "dependency {dependency}"),
        }
    }
}

pub type InjectionGraph = DirectedGraph<InjectionGraphVertex>;

/// Builds one graph per root-to-leaf path through the subcomponent tree, starting at the root
/// component of the context. A component which is already part of the path being built is not
/// expanded again - the closing edge is added and the graph is emitted as complete.
pub fn build_injection_graphs(context: &InjectionContext) -> Vec<InjectionGraph> {
    let mut graphs = vec![];

    match context.root_component() {
        Some(root) => build_component_graphs(context, root, InjectionGraph::new(), &mut graphs),
        None => warn!(
            "Root component {} is not present in the context",
            context.root_component_type()
        ),
    }

    debug!("Built {} injection graphs", graphs.len());

    graphs
}

fn build_component_graphs(
    context: &InjectionContext,
    component: &Component,
    mut graph: InjectionGraph,
    graphs: &mut Vec<InjectionGraph>,
) {
    add_component(&mut graph, component);

    let subcomponents = component
        .subcomponents
        .iter()
        .filter_map(|ty| {
            let subcomponent = context.find_component(ty);
            if subcomponent.is_none() {
                warn!("Subcomponent {} of {} is not a component", ty, component.ty);
            }
            subcomponent
        })
        .collect::<Vec<_>>();

    if subcomponents.is_empty() {
        graphs.push(graph);
        return;
    }

    let component_vertex = InjectionGraphVertex::Component(component.ty.clone());
    for subcomponent in subcomponents {
        let subcomponent_vertex = InjectionGraphVertex::Component(subcomponent.ty.clone());
        let revisited = graph.contains_vertex(&subcomponent_vertex);

        let mut child_graph = graph.clone();
        child_graph.put_edge(component_vertex.clone(), subcomponent_vertex);

        if revisited {
            graphs.push(child_graph);
        } else {
            build_component_graphs(context, subcomponent, child_graph, graphs);
        }
    }
}

fn add_component(graph: &mut InjectionGraph, component: &Component) {
    let component_vertex = InjectionGraphVertex::Component(component.ty.clone());
    graph.put_edge(
        component_vertex,
        InjectionGraphVertex::Module(component.default_module.ty.clone()),
    );
    add_module(graph, &component.default_module);
}

fn add_module(graph: &mut InjectionGraph, module: &Module) {
    let module_vertex = InjectionGraphVertex::Module(module.ty.clone());

    // already expanded through another import - fan-in is enough to detect duplicates
    if graph.contains_vertex(&module_vertex) {
        return;
    }

    graph.put_vertex(module_vertex.clone());

    for provider in &module.providers {
        graph.put_edge(
            module_vertex.clone(),
            InjectionGraphVertex::Dependency(provider.dependency().boxed()),
        );
    }

    for imported_module in &module.modules {
        graph.put_edge(
            module_vertex.clone(),
            InjectionGraphVertex::Module(imported_module.ty.clone()),
        );
        add_module(graph, imported_module);
    }
}

/// Returns components of the graph in path order.
pub fn components<'a>(
    graph: &InjectionGraph,
    context: &'a InjectionContext,
) -> Vec<&'a Component> {
    graph
        .vertices()
        .filter_map(|vertex| match vertex {
            InjectionGraphVertex::Component(ty) => context.find_component(ty),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::model::{Component, InjectionContext, Module};
    use crate::types::Type;
    use crate::validator::injection_graph::{
        build_injection_graphs, components, InjectionGraphVertex,
    };

    fn component(name: &str, subcomponents: &[&str]) -> Component {
        Component {
            ty: Type::object(name),
            default_module: Module::new(Type::object(name), vec![], vec![]),
            parent: None,
            subcomponents: subcomponents.iter().map(Type::object).collect(),
        }
    }

    fn path(
        graph: &crate::validator::injection_graph::InjectionGraph,
        context: &InjectionContext,
    ) -> Vec<String> {
        components(graph, context)
            .into_iter()
            .map(|component| component.ty.to_string())
            .collect()
    }

    #[test]
    fn should_build_graph_per_path() {
        let context = InjectionContext::new(
            Type::object("a/Root"),
            vec![
                component("a/Root", &["a/A", "a/B"]),
                component("a/A", &["a/C"]),
                component("a/B", &[]),
                component("a/C", &[]),
            ],
            vec![],
            vec![],
        );

        let graphs = build_injection_graphs(&context);
        assert_eq!(graphs.len(), 2);
        assert_eq!(path(&graphs[0], &context), vec!["a/Root", "a/A", "a/C"]);
        assert_eq!(path(&graphs[1], &context), vec!["a/Root", "a/B"]);
    }

    #[test]
    fn should_close_graph_on_revisited_component() {
        let context = InjectionContext::new(
            Type::object("a/Root"),
            vec![
                component("a/Root", &["a/A"]),
                component("a/A", &["a/Root"]),
            ],
            vec![],
            vec![],
        );

        let graphs = build_injection_graphs(&context);
        assert_eq!(graphs.len(), 1);
        assert!(graphs[0]
            .adjacent_vertices(&InjectionGraphVertex::Component(Type::object("a/A")))
            .any(|vertex| *vertex == InjectionGraphVertex::Component(Type::object("a/Root"))));
    }

    #[test]
    fn should_link_modules_and_dependencies() {
        let mut root = component("a/Root", &[]);
        root.default_module
            .modules
            .push(Module::new(Type::object("a/Imported"), vec![], vec![]));

        let context = InjectionContext::new(Type::object("a/Root"), vec![root], vec![], vec![]);
        let graphs = build_injection_graphs(&context);

        assert!(graphs[0].contains_vertex(&InjectionGraphVertex::Module(Type::object(
            "a/Imported"
        ))));
    }
}
