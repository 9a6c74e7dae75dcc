use std::sync::Arc;

use crate::entities::{ComponentData, ComponentRef, FieldRef, FileObject, FileRef, MethodRef, NamespaceRef, PackageRef};
use crate::enums::{AccessSpecifier, NodeKind, UdtKind};
use crate::lockable::{push_unique, Entity, EntityState};
use crate::relations::peer_relation;

/// A user defined type: class, struct, union, enum or alias.
#[derive(Default)]
pub struct TypeData {
    pub kind: UdtKind,
    pub access: AccessSpecifier,
    pub(crate) namespace: Option<NamespaceRef>,
    pub(crate) package: Option<PackageRef>,
    pub(crate) parent: Option<TypeRef>,
    pub(crate) children: Vec<TypeRef>,
    pub(crate) superclasses: Vec<TypeRef>,
    pub(crate) subclasses: Vec<TypeRef>,
    pub(crate) uses_in_interface: Vec<TypeRef>,
    pub(crate) reverse_uses_in_interface: Vec<TypeRef>,
    pub(crate) uses_in_implementation: Vec<TypeRef>,
    pub(crate) reverse_uses_in_implementation: Vec<TypeRef>,
    pub(crate) files: Vec<FileRef>,
    pub(crate) components: Vec<ComponentRef>,
    pub(crate) methods: Vec<MethodRef>,
    pub(crate) fields: Vec<FieldRef>,
}

impl EntityState for TypeData {
    const KIND: NodeKind = NodeKind::Type;
}

impl TypeData {
    pub fn namespace(&self) -> Option<&NamespaceRef> {
        self.namespace.as_ref()
    }

    pub fn package(&self) -> Option<&PackageRef> {
        self.package.as_ref()
    }

    /// Enclosing type of a nested type.
    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[TypeRef] {
        &self.children
    }

    pub fn superclasses(&self) -> &[TypeRef] {
        &self.superclasses
    }

    pub fn subclasses(&self) -> &[TypeRef] {
        &self.subclasses
    }

    pub fn uses_in_the_interface(&self) -> &[TypeRef] {
        &self.uses_in_interface
    }

    pub fn reverse_uses_in_the_interface(&self) -> &[TypeRef] {
        &self.reverse_uses_in_interface
    }

    pub fn uses_in_the_implementation(&self) -> &[TypeRef] {
        &self.uses_in_implementation
    }

    pub fn reverse_uses_in_the_implementation(&self) -> &[TypeRef] {
        &self.reverse_uses_in_implementation
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn components(&self) -> &[ComponentRef] {
        &self.components
    }

    pub fn methods(&self) -> &[MethodRef] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldRef] {
        &self.fields
    }

    pub(crate) fn add_child(&mut self, child: &TypeRef) {
        push_unique(&mut self.children, child);
    }

    pub(crate) fn add_method(&mut self, method: &MethodRef) {
        push_unique(&mut self.methods, method);
    }

    pub(crate) fn add_field(&mut self, field: &FieldRef) {
        push_unique(&mut self.fields, field);
    }
}

peer_relation!(
    /// Derived → base.
    IS_A: TypeData => TypeData, superclasses, subclasses
);
peer_relation!(USES_IN_INTERFACE: TypeData => TypeData, uses_in_interface, reverse_uses_in_interface);
peer_relation!(
    USES_IN_IMPLEMENTATION: TypeData => TypeData, uses_in_implementation, reverse_uses_in_implementation
);
peer_relation!(TYPE_COMPONENT: TypeData => ComponentData, components, types);

pub type TypeObject = Entity<TypeData>;
pub type TypeRef = Arc<TypeObject>;

impl TypeObject {
    pub fn add_is_a(derived: &TypeRef, base: &TypeRef) -> bool {
        IS_A.add(derived, base)
    }

    pub fn add_uses_in_the_interface(source: &TypeRef, target: &TypeRef) -> bool {
        USES_IN_INTERFACE.add(source, target)
    }

    pub fn remove_uses_in_the_interface(source: &TypeRef, target: &TypeRef) -> bool {
        USES_IN_INTERFACE.remove(source, target)
    }

    pub fn add_uses_in_the_implementation(source: &TypeRef, target: &TypeRef) -> bool {
        USES_IN_IMPLEMENTATION.add(source, target)
    }

    pub fn remove_uses_in_the_implementation(source: &TypeRef, target: &TypeRef) -> bool {
        USES_IN_IMPLEMENTATION.remove(source, target)
    }

    pub fn add_component(ty: &TypeRef, component: &ComponentRef) -> bool {
        TYPE_COMPONENT.add(ty, component)
    }

    /// Make `file` the only file of `ty`, detaching it from every other file.
    pub fn set_unique_file(ty: &TypeRef, file: &FileRef) {
        let current = ty.with_ro_lock(|t| t.files.clone());
        for other in current.iter().filter(|f| !Arc::ptr_eq(f, file)) {
            FileObject::remove_type(other, ty);
        }
        FileObject::add_type(file, ty);
    }

    /// Make `component` the only component of `ty`. `None` detaches it from all.
    pub fn set_unique_component(ty: &TypeRef, component: Option<&ComponentRef>) {
        let current = ty.with_ro_lock(|t| t.components.clone());
        for other in &current {
            if component.is_some_and(|c| Arc::ptr_eq(c, other)) {
                continue;
            }
            TYPE_COMPONENT.remove(ty, other);
        }
        if let Some(component) = component {
            TYPE_COMPONENT.add(ty, component);
        }
    }

    /// Move `ty` to `package`, keeping the package side in sync.
    pub fn set_package(ty: &TypeRef, package: Option<&PackageRef>) {
        let old = ty.with_rw_lock(|t| std::mem::replace(&mut t.package, package.cloned()));
        if let Some(old) = old {
            if package.is_some_and(|p| Arc::ptr_eq(p, &old)) {
                return;
            }
            old.with_rw_lock(|p| p.remove_type(ty));
        }
        if let Some(package) = package {
            package.with_rw_lock(|p| p.add_type(ty));
        }
    }
}
