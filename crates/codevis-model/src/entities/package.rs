use std::sync::Arc;

use crate::entities::{ComponentRef, RepositoryRef, TypeRef};
use crate::enums::NodeKind;
use crate::lockable::{push_unique, remove_item, Entity, EntityState};
use crate::relations::peer_relation;

/// A package, or a package group when it has children and no parent.
#[derive(Default)]
pub struct PackageData {
    pub disk_path: String,
    pub(crate) parent: Option<PackageRef>,
    pub(crate) repository: Option<RepositoryRef>,
    pub(crate) children: Vec<PackageRef>,
    pub(crate) components: Vec<ComponentRef>,
    pub(crate) forward_dependencies: Vec<PackageRef>,
    pub(crate) reverse_dependencies: Vec<PackageRef>,
    pub(crate) types: Vec<TypeRef>,
}

impl EntityState for PackageData {
    const KIND: NodeKind = NodeKind::Package;
}

impl PackageData {
    pub fn parent(&self) -> Option<&PackageRef> {
        self.parent.as_ref()
    }

    pub fn repository(&self) -> Option<&RepositoryRef> {
        self.repository.as_ref()
    }

    pub fn children(&self) -> &[PackageRef] {
        &self.children
    }

    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    pub fn forward_dependencies(&self) -> &[PackageRef] {
        &self.forward_dependencies
    }

    pub fn reverse_dependencies(&self) -> &[PackageRef] {
        &self.reverse_dependencies
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    pub(crate) fn add_child(&mut self, child: &PackageRef) {
        push_unique(&mut self.children, child);
    }

    pub(crate) fn add_component(&mut self, component: &ComponentRef) {
        push_unique(&mut self.components, component);
    }

    pub fn add_type(&mut self, ty: &TypeRef) {
        push_unique(&mut self.types, ty);
    }

    pub fn remove_type(&mut self, ty: &TypeRef) {
        remove_item(&mut self.types, ty);
    }
}

peer_relation!(
    /// Package → package dependency.
    PACKAGE_DEPENDENCY: PackageData => PackageData, forward_dependencies, reverse_dependencies
);

pub type PackageObject = Entity<PackageData>;
pub type PackageRef = Arc<PackageObject>;

impl PackageObject {
    pub fn add_dependency(source: &PackageRef, target: &PackageRef) -> bool {
        PACKAGE_DEPENDENCY.add(source, target)
    }

    pub fn remove_dependency(source: &PackageRef, target: &PackageRef) -> bool {
        PACKAGE_DEPENDENCY.remove(source, target)
    }
}
