use std::sync::Arc;

use crate::entities::PackageRef;
use crate::enums::NodeKind;
use crate::lockable::{push_unique, Entity, EntityState};

#[derive(Default)]
pub struct RepositoryData {
    pub disk_path: String,
    pub(crate) children: Vec<PackageRef>,
}

impl EntityState for RepositoryData {
    const KIND: NodeKind = NodeKind::Repository;
}

impl RepositoryData {
    pub fn children(&self) -> &[PackageRef] {
        &self.children
    }

    pub(crate) fn add_child(&mut self, package: &PackageRef) {
        push_unique(&mut self.children, package);
    }
}

pub type RepositoryObject = Entity<RepositoryData>;
pub type RepositoryRef = Arc<RepositoryObject>;
