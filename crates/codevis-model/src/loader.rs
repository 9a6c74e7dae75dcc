//! Physical loader: the graph a viewer shows for one package, package group
//! or component.

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use tracing::debug;

use codevis_core::errors::LoaderError;
use codevis_core::types::collections::FxHashMap;

use crate::enums::NodeKind;
use crate::node::Node;
use crate::store::ObjectStore;

/// What kind of entity the qualified name names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    Component,
    Package,
    Group,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadFlags {
    /// Direct providers of the main node.
    pub fwd_deps: bool,
    /// Direct clients of the main node.
    pub rev_deps: bool,
    /// Providers of the main node's children that live outside it.
    pub ext_deps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadedEdge {
    Contains,
    DependsOn,
}

/// The loaded vertices and the edges among them.
#[derive(Default)]
pub struct PhysicalGraph {
    graph: StableDiGraph<Node, LoadedEdge>,
    index: FxHashMap<(NodeKind, String), NodeIndex>,
}

impl PhysicalGraph {
    fn insert(&mut self, node: &Node) -> bool {
        let key = (node.kind(), node.qualified_name().to_string());
        if self.index.contains_key(&key) {
            return false;
        }
        let idx = self.graph.add_node(node.clone());
        self.index.insert(key, idx);
        true
    }

    fn index_of(&self, node: &Node) -> Option<NodeIndex> {
        self.index
            .get(&(node.kind(), node.qualified_name().to_string()))
            .copied()
    }

    pub fn contains(&self, node: &Node) -> bool {
        self.index_of(node).is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `(kind, qualified name)` of every vertex, sorted.
    pub fn vertices(&self) -> Vec<(NodeKind, String)> {
        let mut out: Vec<_> = self.index.keys().cloned().collect();
        out.sort();
        out
    }

    /// `(source, target, kind)` of every edge, sorted.
    pub fn edges(&self) -> Vec<(String, String, LoadedEdge)> {
        let mut out: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].qualified_name().to_string(),
                    self.graph[e.target()].qualified_name().to_string(),
                    *e.weight(),
                )
            })
            .collect();
        out.sort();
        out
    }

    /// Adds containment and dependency edges between vertices already loaded.
    fn connect(&mut self) {
        let indices: Vec<NodeIndex> = self.graph.node_indices().collect();
        for idx in indices {
            let node = self.graph[idx].clone();
            if let Some(parent) = node.parent().and_then(|p| self.index_of(&p)) {
                self.graph.update_edge(parent, idx, LoadedEdge::Contains);
            }
            for dep in node.dependencies() {
                if let Some(target) = self.index_of(&dep) {
                    if target != idx {
                        self.graph.update_edge(idx, target, LoadedEdge::DependsOn);
                    }
                }
            }
        }
    }
}

pub struct PhysicalLoader<'a> {
    store: &'a ObjectStore,
}

impl<'a> PhysicalLoader<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    pub fn find(&self, target: LoadTarget, qualified_name: &str) -> Result<Node, LoaderError> {
        let found = match target {
            LoadTarget::Component => self.store.component(qualified_name).map(Node::Component),
            LoadTarget::Package | LoadTarget::Group => self.store.package(qualified_name).map(Node::Package),
        };
        found.ok_or_else(|| LoaderError::NodeNotFound {
            kind: match target {
                LoadTarget::Component => "component",
                LoadTarget::Package => "package",
                LoadTarget::Group => "package group",
            },
            qualified_name: qualified_name.to_string(),
        })
    }

    pub fn load_by_name(
        &self,
        target: LoadTarget,
        qualified_name: &str,
        flags: LoadFlags,
    ) -> Result<PhysicalGraph, LoaderError> {
        let node = self.find(target, qualified_name)?;
        Ok(self.load(&node, flags))
    }

    /// Loads `main`, its parent chain, its children, and the dependencies
    /// selected by `flags`.
    pub fn load(&self, main: &Node, flags: LoadFlags) -> PhysicalGraph {
        let mut graph = PhysicalGraph::default();
        graph.insert(main);

        let mut ancestor = main.parent();
        while let Some(parent) = ancestor {
            graph.insert(&parent);
            ancestor = parent.parent();
        }

        let children = main.children();
        for child in &children {
            graph.insert(child);
        }

        if flags.fwd_deps {
            for dep in main.dependencies() {
                graph.insert(&dep);
            }
        }
        if flags.rev_deps {
            for dep in main.reverse_dependencies() {
                graph.insert(&dep);
            }
        }
        if flags.ext_deps {
            for child in &children {
                for dep in child.dependencies() {
                    if !is_within(&dep, main) {
                        graph.insert(&dep);
                    }
                }
            }
        }

        graph.connect();
        debug!(
            main = main.qualified_name(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "physical graph loaded"
        );
        graph
    }
}

fn is_within(node: &Node, container: &Node) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if &n == container {
            return true;
        }
        current = n.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PackageObject;

    fn fixture() -> ObjectStore {
        let store = ObjectStore::new();
        let grp = store.get_or_add_package("groups/abc", "abc", "", None, None);
        let abcx = store.get_or_add_package("groups/abc/abcx", "abcx", "", Some(&grp), None);
        let abcy = store.get_or_add_package("groups/abc/abcy", "abcy", "", Some(&grp), None);
        let other = store.get_or_add_package("groups/xyz/xyzw", "xyzw", "", None, None);
        PackageObject::add_dependency(&abcx, &abcy);
        PackageObject::add_dependency(&abcy, &other);
        store
    }

    #[test]
    fn unknown_name_is_an_error() {
        let store = fixture();
        let err = PhysicalLoader::new(&store)
            .load_by_name(LoadTarget::Package, "nope", LoadFlags::default())
            .err()
            .unwrap();
        assert!(matches!(err, LoaderError::NodeNotFound { .. }));
    }

    #[test]
    fn group_loads_children_and_internal_edges() {
        let store = fixture();
        let graph = PhysicalLoader::new(&store)
            .load_by_name(LoadTarget::Group, "groups/abc", LoadFlags::default())
            .unwrap();
        assert_eq!(graph.vertex_count(), 3);
        assert!(graph.edges().contains(&(
            "groups/abc/abcx".to_string(),
            "groups/abc/abcy".to_string(),
            LoadedEdge::DependsOn
        )));
    }

    #[test]
    fn ext_deps_pull_in_outside_providers() {
        let store = fixture();
        let flags = LoadFlags {
            ext_deps: true,
            ..Default::default()
        };
        let graph = PhysicalLoader::new(&store)
            .load_by_name(LoadTarget::Group, "groups/abc", flags)
            .unwrap();
        assert_eq!(graph.vertex_count(), 4);
        assert!(graph
            .vertices()
            .contains(&(NodeKind::Package, "groups/xyz/xyzw".to_string())));
    }

    #[test]
    fn package_loads_parent_chain_and_selected_deps() {
        let store = fixture();
        let loader = PhysicalLoader::new(&store);
        let plain = loader
            .load_by_name(LoadTarget::Package, "groups/abc/abcy", LoadFlags::default())
            .unwrap();
        assert_eq!(plain.vertex_count(), 2);

        let both = loader
            .load_by_name(
                LoadTarget::Package,
                "groups/abc/abcy",
                LoadFlags {
                    fwd_deps: true,
                    rev_deps: true,
                    ext_deps: false,
                },
            )
            .unwrap();
        assert_eq!(both.vertex_count(), 4);
    }
}
