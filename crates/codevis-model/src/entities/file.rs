use std::sync::Arc;

use crate::entities::{ComponentRef, FunctionRef, NamespaceData, NamespaceRef, PackageRef, TypeData, TypeRef};
use crate::enums::NodeKind;
use crate::lockable::{push_unique, Entity, EntityState};
use crate::relations::peer_relation;

#[derive(Default)]
pub struct FileData {
    pub is_header: bool,
    /// Content hash, empty when the file could not be read.
    pub hash: String,
    pub(crate) package: Option<PackageRef>,
    pub(crate) component: Option<ComponentRef>,
    pub(crate) forward_includes: Vec<FileRef>,
    pub(crate) reverse_includes: Vec<FileRef>,
    pub(crate) namespaces: Vec<NamespaceRef>,
    pub(crate) types: Vec<TypeRef>,
    pub(crate) global_functions: Vec<FunctionRef>,
}

impl EntityState for FileData {
    const KIND: NodeKind = NodeKind::File;
}

impl FileData {
    pub fn package(&self) -> Option<&PackageRef> {
        self.package.as_ref()
    }

    pub fn component(&self) -> Option<&ComponentRef> {
        self.component.as_ref()
    }

    pub fn forward_includes(&self) -> &[FileRef] {
        &self.forward_includes
    }

    pub fn reverse_includes(&self) -> &[FileRef] {
        &self.reverse_includes
    }

    pub fn namespaces(&self) -> &[NamespaceRef] {
        &self.namespaces
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    pub fn global_functions(&self) -> &[FunctionRef] {
        &self.global_functions
    }

    pub fn add_global_function(&mut self, function: &FunctionRef) {
        push_unique(&mut self.global_functions, function);
    }
}

peer_relation!(INCLUDE: FileData => FileData, forward_includes, reverse_includes);
peer_relation!(FILE_NAMESPACE: FileData => NamespaceData, namespaces, files);
peer_relation!(FILE_TYPE: FileData => TypeData, types, files);

pub type FileObject = Entity<FileData>;
pub type FileRef = Arc<FileObject>;

impl FileObject {
    /// `source` includes `target`.
    pub fn add_include_relation(source: &FileRef, target: &FileRef) -> bool {
        INCLUDE.add(source, target)
    }

    pub fn remove_include_relation(source: &FileRef, target: &FileRef) -> bool {
        INCLUDE.remove(source, target)
    }

    /// Records that `namespace` is opened in `file`, on both sides.
    pub fn add_namespace(file: &FileRef, namespace: &NamespaceRef) -> bool {
        FILE_NAMESPACE.add(file, namespace)
    }

    /// Records that `ty` is declared in `file`, on both sides.
    pub fn add_type(file: &FileRef, ty: &TypeRef) -> bool {
        FILE_TYPE.add(file, ty)
    }

    pub fn remove_type(file: &FileRef, ty: &TypeRef) -> bool {
        FILE_TYPE.remove(file, ty)
    }
}
