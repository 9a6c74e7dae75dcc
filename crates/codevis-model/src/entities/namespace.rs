use std::sync::Arc;

use crate::entities::{FileRef, FunctionRef, TypeRef, VariableRef};
use crate::enums::NodeKind;
use crate::lockable::{push_unique, Entity, EntityState};

#[derive(Default)]
pub struct NamespaceData {
    pub(crate) parent: Option<NamespaceRef>,
    pub(crate) children: Vec<NamespaceRef>,
    pub(crate) types: Vec<TypeRef>,
    pub(crate) files: Vec<FileRef>,
    pub(crate) functions: Vec<FunctionRef>,
    pub(crate) variables: Vec<VariableRef>,
}

impl EntityState for NamespaceData {
    const KIND: NodeKind = NodeKind::Namespace;
}

impl NamespaceData {
    pub fn parent(&self) -> Option<&NamespaceRef> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[NamespaceRef] {
        &self.children
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn functions(&self) -> &[FunctionRef] {
        &self.functions
    }

    pub fn variables(&self) -> &[VariableRef] {
        &self.variables
    }

    pub(crate) fn add_child(&mut self, child: &NamespaceRef) {
        push_unique(&mut self.children, child);
    }

    pub(crate) fn add_type(&mut self, ty: &TypeRef) {
        push_unique(&mut self.types, ty);
    }

    pub(crate) fn add_function(&mut self, function: &FunctionRef) {
        push_unique(&mut self.functions, function);
    }

    pub(crate) fn add_variable(&mut self, variable: &VariableRef) {
        push_unique(&mut self.variables, variable);
    }
}

pub type NamespaceObject = Entity<NamespaceData>;
pub type NamespaceRef = Arc<NamespaceObject>;
