use std::sync::Arc;

use crate::entities::{FileRef, PackageRef, TypeRef};
use crate::enums::NodeKind;
use crate::lockable::{push_unique, Entity, EntityState};
use crate::relations::peer_relation;

#[derive(Default)]
pub struct ComponentData {
    pub(crate) package: Option<PackageRef>,
    pub(crate) files: Vec<FileRef>,
    pub(crate) forward_dependencies: Vec<ComponentRef>,
    pub(crate) reverse_dependencies: Vec<ComponentRef>,
    pub(crate) types: Vec<TypeRef>,
}

impl EntityState for ComponentData {
    const KIND: NodeKind = NodeKind::Component;
}

impl ComponentData {
    pub fn package(&self) -> Option<&PackageRef> {
        self.package.as_ref()
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn forward_dependencies(&self) -> &[ComponentRef] {
        &self.forward_dependencies
    }

    pub fn reverse_dependencies(&self) -> &[ComponentRef] {
        &self.reverse_dependencies
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    pub(crate) fn add_file(&mut self, file: &FileRef) {
        push_unique(&mut self.files, file);
    }
}

peer_relation!(COMPONENT_DEPENDENCY: ComponentData => ComponentData, forward_dependencies, reverse_dependencies);

pub type ComponentObject = Entity<ComponentData>;
pub type ComponentRef = Arc<ComponentObject>;

impl ComponentObject {
    pub fn add_dependency(source: &ComponentRef, target: &ComponentRef) -> bool {
        COMPONENT_DEPENDENCY.add(source, target)
    }

    pub fn remove_dependency(source: &ComponentRef, target: &ComponentRef) -> bool {
        COMPONENT_DEPENDENCY.remove(source, target)
    }
}
