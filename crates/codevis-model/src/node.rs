//! Closed sum type over the entity kinds a graph consumer can navigate, and
//! the read-only view handed to plugins.

use std::sync::Arc;

use crate::entities::*;
use crate::enums::NodeKind;

/// A handle to one navigable entity.
#[derive(Debug, Clone)]
pub enum Node {
    File(FileRef),
    Package(PackageRef),
    Component(ComponentRef),
    Namespace(NamespaceRef),
    Type(TypeRef),
    Method(MethodRef),
    Field(FieldRef),
}

macro_rules! node_dispatch {
    ($node:expr, $e:ident => $body:expr) => {
        match $node {
            Node::File($e) => $body,
            Node::Package($e) => $body,
            Node::Component($e) => $body,
            Node::Namespace($e) => $body,
            Node::Type($e) => $body,
            Node::Method($e) => $body,
            Node::Field($e) => $body,
        }
    };
}

fn nodes<T: Clone>(items: &[T], wrap: fn(T) -> Node) -> impl Iterator<Item = Node> + '_ {
    items.iter().cloned().map(wrap)
}

fn push_distinct(out: &mut Vec<Node>, node: Node) {
    if !out.contains(&node) {
        out.push(node);
    }
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        node_dispatch!(self, e => e.kind())
    }

    pub fn qualified_name(&self) -> &str {
        node_dispatch!(self, e => e.qualified_name())
    }

    pub fn name(&self) -> &str {
        node_dispatch!(self, e => e.name())
    }

    /// The structural owner: component of a file, parent package, package of
    /// a component, enclosing namespace or type, owning type of a member.
    pub fn parent(&self) -> Option<Node> {
        match self {
            Node::File(f) => f.read().component().cloned().map(Node::Component),
            Node::Package(p) => p.read().parent().cloned().map(Node::Package),
            Node::Component(c) => c.read().package().cloned().map(Node::Package),
            Node::Namespace(n) => n.read().parent().cloned().map(Node::Namespace),
            Node::Type(t) => {
                let data = t.read();
                data.parent()
                    .cloned()
                    .map(Node::Type)
                    .or_else(|| data.namespace().cloned().map(Node::Namespace))
            }
            Node::Method(m) => m.read().parent().cloned().map(Node::Type),
            Node::Field(f) => f.read().parent().cloned().map(Node::Type),
        }
    }

    pub fn children(&self) -> Vec<Node> {
        match self {
            Node::File(f) => nodes(f.read().types(), Node::Type).collect(),
            Node::Package(p) => {
                let data = p.read();
                nodes(data.children(), Node::Package)
                    .chain(nodes(data.components(), Node::Component))
                    .collect()
            }
            Node::Component(c) => nodes(c.read().files(), Node::File).collect(),
            Node::Namespace(n) => {
                let data = n.read();
                nodes(data.children(), Node::Namespace)
                    .chain(nodes(data.types(), Node::Type))
                    .collect()
            }
            Node::Type(t) => {
                let data = t.read();
                nodes(data.children(), Node::Type)
                    .chain(nodes(data.methods(), Node::Method))
                    .chain(nodes(data.fields(), Node::Field))
                    .collect()
            }
            Node::Method(_) | Node::Field(_) => Vec::new(),
        }
    }

    /// Outgoing edges: includes, package/component dependencies, is-a and
    /// uses relationships, member signature types.
    pub fn dependencies(&self) -> Vec<Node> {
        let mut out = Vec::new();
        match self {
            Node::File(f) => out.extend(nodes(f.read().forward_includes(), Node::File)),
            Node::Package(p) => out.extend(nodes(p.read().forward_dependencies(), Node::Package)),
            Node::Component(c) => out.extend(nodes(c.read().forward_dependencies(), Node::Component)),
            Node::Namespace(_) => {}
            Node::Type(t) => {
                let data = t.read();
                for dep in nodes(data.superclasses(), Node::Type)
                    .chain(nodes(data.uses_in_the_interface(), Node::Type))
                    .chain(nodes(data.uses_in_the_implementation(), Node::Type))
                {
                    push_distinct(&mut out, dep);
                }
            }
            Node::Method(m) => {
                for dep in nodes(m.read().argument_types(), Node::Type) {
                    push_distinct(&mut out, dep);
                }
            }
            Node::Field(f) => {
                for dep in nodes(f.read().variable_types(), Node::Type) {
                    push_distinct(&mut out, dep);
                }
            }
        }
        out
    }

    /// Incoming edges of the same relationship kinds as [`Node::dependencies`].
    /// Members have none.
    pub fn reverse_dependencies(&self) -> Vec<Node> {
        let mut out = Vec::new();
        match self {
            Node::File(f) => out.extend(nodes(f.read().reverse_includes(), Node::File)),
            Node::Package(p) => out.extend(nodes(p.read().reverse_dependencies(), Node::Package)),
            Node::Component(c) => out.extend(nodes(c.read().reverse_dependencies(), Node::Component)),
            Node::Type(t) => {
                let data = t.read();
                for dep in nodes(data.subclasses(), Node::Type)
                    .chain(nodes(data.reverse_uses_in_the_interface(), Node::Type))
                    .chain(nodes(data.reverse_uses_in_the_implementation(), Node::Type))
                {
                    push_distinct(&mut out, dep);
                }
            }
            Node::Namespace(_) | Node::Method(_) | Node::Field(_) => {}
        }
        out
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Node::File(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_package(&self) -> Option<&PackageRef> {
        match self {
            Node::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Node::Component(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&NamespaceRef> {
        match self {
            Node::Namespace(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Node::Type(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodRef> {
        match self {
            Node::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldRef> {
        match self {
            Node::Field(f) => Some(f),
            _ => None,
        }
    }
}

/// Identity, not structural, equality.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::File(a), Node::File(b)) => Arc::ptr_eq(a, b),
            (Node::Package(a), Node::Package(b)) => Arc::ptr_eq(a, b),
            (Node::Component(a), Node::Component(b)) => Arc::ptr_eq(a, b),
            (Node::Namespace(a), Node::Namespace(b)) => Arc::ptr_eq(a, b),
            (Node::Type(a), Node::Type(b)) => Arc::ptr_eq(a, b),
            (Node::Method(a), Node::Method(b)) => Arc::ptr_eq(a, b),
            (Node::Field(a), Node::Field(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Node {}

impl From<FileRef> for Node {
    fn from(value: FileRef) -> Self {
        Node::File(value)
    }
}

impl From<PackageRef> for Node {
    fn from(value: PackageRef) -> Self {
        Node::Package(value)
    }
}

impl From<ComponentRef> for Node {
    fn from(value: ComponentRef) -> Self {
        Node::Component(value)
    }
}

impl From<NamespaceRef> for Node {
    fn from(value: NamespaceRef) -> Self {
        Node::Namespace(value)
    }
}

impl From<TypeRef> for Node {
    fn from(value: TypeRef) -> Self {
        Node::Type(value)
    }
}

impl From<MethodRef> for Node {
    fn from(value: MethodRef) -> Self {
        Node::Method(value)
    }
}

impl From<FieldRef> for Node {
    fn from(value: FieldRef) -> Self {
        Node::Field(value)
    }
}

/// Plugin-facing handle. Exposes identity and navigation only; no mutation
/// and no access to the underlying locks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityView {
    node: Node,
}

impl EntityView {
    pub fn new(node: impl Into<Node>) -> Self {
        Self { node: node.into() }
    }

    pub fn name(&self) -> String {
        self.node.name().to_string()
    }

    pub fn qualified_name(&self) -> String {
        self.node.qualified_name().to_string()
    }

    /// Kind name, e.g. `"package"`.
    pub fn type_name(&self) -> &'static str {
        self.node.kind().as_str()
    }

    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    pub fn parent(&self) -> Option<EntityView> {
        self.node.parent().map(|node| EntityView { node })
    }

    pub fn children(&self) -> Vec<EntityView> {
        self.node.children().into_iter().map(|node| EntityView { node }).collect()
    }

    pub fn dependencies(&self) -> Vec<EntityView> {
        self.node.dependencies().into_iter().map(|node| EntityView { node }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AccessSpecifier, UdtKind};
    use crate::store::{ObjectStore, TypeDecl};

    fn class<'a>(qualified_name: &'a str, namespace: Option<&'a NamespaceRef>) -> TypeDecl<'a> {
        TypeDecl {
            qualified_name,
            name: qualified_name.rsplit("::").next().unwrap_or(qualified_name),
            kind: UdtKind::Class,
            access: AccessSpecifier::None,
            namespace,
            package: None,
            parent: None,
        }
    }

    #[test]
    fn type_parent_falls_back_to_namespace() {
        let store = ObjectStore::new();
        let ns = store.get_or_add_namespace("bal", "bal", None);
        let ty = store.get_or_add_type(class("bal::Thing", Some(&ns)));
        let parent = Node::from(ty).parent().unwrap();
        assert_eq!(parent.kind(), NodeKind::Namespace);
        assert_eq!(parent.qualified_name(), "bal");
    }

    #[test]
    fn type_dependencies_are_distinct() {
        let store = ObjectStore::new();
        let a = store.get_or_add_type(class("A", None));
        let b = store.get_or_add_type(class("B", None));
        TypeObject::add_is_a(&a, &b);
        TypeObject::add_uses_in_the_interface(&a, &b);
        TypeObject::add_uses_in_the_implementation(&a, &b);

        let deps = Node::from(Arc::clone(&a)).dependencies();
        assert_eq!(deps, vec![Node::from(Arc::clone(&b))]);
        let rev = Node::from(b).reverse_dependencies();
        assert_eq!(rev, vec![Node::from(a)]);
    }

    #[test]
    fn view_navigates_package_tree() {
        let store = ObjectStore::new();
        let grp = store.get_or_add_package("groups/bsl", "bsl", "", None, None);
        let pkg = store.get_or_add_package("groups/bsl/bslma", "bslma", "", Some(&grp), None);
        store.get_or_add_component("groups/bsl/bslma/bslma_allocator", "bslma_allocator", Some(&pkg));

        let view = EntityView::new(grp);
        assert_eq!(view.type_name(), "package");
        let children = view.children();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].qualified_name(), "groups/bsl/bslma");
        let grandchildren = children[0].children();
        assert_eq!(grandchildren[0].type_name(), "component");
        assert_eq!(children[0].parent().unwrap().name(), "bsl");
    }

    #[test]
    fn accessors_match_only_their_variant() {
        let store = ObjectStore::new();
        let pkg = store.get_or_add_package("groups/bsl/bslma", "bslma", "", None, None);
        let comp = store.get_or_add_component("groups/bsl/bslma/bslma_allocator", "bslma_allocator", Some(&pkg));
        let file = store.get_or_add_file("bslma_allocator.h", "bslma_allocator.h", true, "", Some(&pkg), Some(&comp));

        let node = Node::from(Arc::clone(&file));
        assert!(Arc::ptr_eq(node.as_file().unwrap(), &file));
        assert!(node.as_package().is_none());
        assert!(node.as_type().is_none());

        let parent = node.parent().unwrap();
        assert!(Arc::ptr_eq(parent.as_component().unwrap(), &comp));
        assert!(parent.as_file().is_none());
        assert!(Arc::ptr_eq(parent.parent().unwrap().as_package().unwrap(), &pkg));
    }
}
