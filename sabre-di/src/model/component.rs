use crate::model::injection::InjectionTarget;
use crate::model::provision::Provider;
use crate::types::Type;
use fxhash::{FxHashMap, FxHashSet};

/// A group of providers, possibly importing other modules.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Module {
    pub ty: Type,
    pub providers: Vec<Provider>,
    pub modules: Vec<Module>,
}

impl Module {
    pub fn new(ty: Type, providers: Vec<Provider>, modules: Vec<Module>) -> Self {
        Self {
            ty,
            providers,
            modules,
        }
    }

    /// Returns this module followed by all transitively imported modules in depth-first order.
    /// Every module type is returned once.
    pub fn flatten(&self) -> Vec<&Module> {
        let mut result = vec![];
        let mut visited = FxHashSet::default();
        let mut stack = vec![self];

        while let Some(module) = stack.pop() {
            if !visited.insert(&module.ty) {
                continue;
            }

            result.push(module);
            stack.extend(module.modules.iter().rev());
        }

        result
    }
}

/// A root of injection with its default module. Components form a tree through their
/// subcomponents.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Component {
    pub ty: Type,
    pub default_module: Module,
    /// `None` for the root of the hierarchy.
    pub parent: Option<Type>,
    pub subcomponents: Vec<Type>,
}

/// Everything found during analysis, indexed by type.
#[derive(Clone, Debug)]
pub struct InjectionContext {
    root_component: Type,
    components: Vec<Component>,
    component_indices: FxHashMap<Type, usize>,
    injectable_targets: Vec<InjectionTarget>,
    injectable_indices: FxHashMap<Type, usize>,
    providable_targets: Vec<InjectionTarget>,
    providable_indices: FxHashMap<Type, usize>,
}

impl InjectionContext {
    /// Creates a new context. The root component should be one of the given components - it is
    /// the starting point of the component hierarchy.
    pub fn new(
        root_component: Type,
        components: Vec<Component>,
        injectable_targets: Vec<InjectionTarget>,
        providable_targets: Vec<InjectionTarget>,
    ) -> Self {
        Self {
            root_component,
            component_indices: index(&components, |component| &component.ty),
            components,
            injectable_indices: index(&injectable_targets, InjectionTarget::ty),
            injectable_targets,
            providable_indices: index(&providable_targets, InjectionTarget::ty),
            providable_targets,
        }
    }

    #[inline]
    pub fn root_component_type(&self) -> &Type {
        &self.root_component
    }

    #[inline]
    pub fn root_component(&self) -> Option<&Component> {
        self.find_component(&self.root_component)
    }

    #[inline]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn find_component(&self, ty: &Type) -> Option<&Component> {
        self.component_indices
            .get(ty)
            .map(|index| &self.components[*index])
    }

    #[inline]
    pub fn injectable_targets(&self) -> &[InjectionTarget] {
        &self.injectable_targets
    }

    pub fn find_injectable_target(&self, ty: &Type) -> Option<&InjectionTarget> {
        self.injectable_indices
            .get(ty)
            .map(|index| &self.injectable_targets[*index])
    }

    #[inline]
    pub fn providable_targets(&self) -> &[InjectionTarget] {
        &self.providable_targets
    }

    pub fn find_providable_target(&self, ty: &Type) -> Option<&InjectionTarget> {
        self.providable_indices
            .get(ty)
            .map(|index| &self.providable_targets[*index])
    }
}

fn index<T, F: Fn(&T) -> &Type>(items: &[T], key: F) -> FxHashMap<Type, usize> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| (key(item).clone(), index))
        .collect()
}
