//! Dropping files, and whatever only they kept alive, from the registry.
//!
//! Every relationship of a removed entity is detached on both sides, so the
//! remaining graph never reaches an entity that is no longer registered.

use std::sync::Arc;

use tracing::debug;

use super::Registry;
use crate::entities::*;
use crate::lockable::remove_item;

impl Registry {
    /// Removes the file and, transitively, every file that includes it, so
    /// that re-parsing the includers rebuilds what they saw through it.
    /// Components left without files go too; packages stay.
    ///
    /// Returns the qualified names of the removed files. Unknown names
    /// remove nothing.
    pub fn remove_file(&mut self, qualified_name: &str) -> Vec<String> {
        let mut removed = Vec::new();
        let mut pending = vec![qualified_name.to_string()];
        while let Some(qn) = pending.pop() {
            let Some(file) = self.files.remove(&qn) else {
                continue;
            };
            pending.extend(
                file.read()
                    .reverse_includes()
                    .iter()
                    .map(|f| f.qualified_name().to_string()),
            );
            self.detach_file(&file);
            removed.push(qn);
        }
        debug!(file = qualified_name, removed = removed.len(), "file removed");
        removed
    }

    fn detach_file(&mut self, file: &FileRef) {
        let (forward, reverse, namespaces, types, functions, component) = {
            let data = file.read();
            (
                data.forward_includes.clone(),
                data.reverse_includes.clone(),
                data.namespaces.clone(),
                data.types.clone(),
                data.global_functions.clone(),
                data.component.clone(),
            )
        };

        for target in &forward {
            FileObject::remove_include_relation(file, target);
        }
        for source in &reverse {
            FileObject::remove_include_relation(source, file);
        }

        for ty in &types {
            FileObject::remove_type(file, ty);
            if ty.read().files().is_empty() {
                self.remove_type(ty);
            }
        }

        for function in &functions {
            let still_defined = self.files.values().any(|f| {
                f.read()
                    .global_functions()
                    .iter()
                    .any(|g| Arc::ptr_eq(g, function))
            });
            if !still_defined {
                self.remove_function(function);
            }
        }

        for namespace in &namespaces {
            FILE_NAMESPACE.remove(file, namespace);
        }
        for namespace in &namespaces {
            self.remove_namespace_if_unused(namespace);
        }

        let file_name = file.qualified_name();
        self.errors.retain(|_, e| e.read().file_name != file_name);

        if let Some(component) = component {
            let now_empty = component.with_rw_lock(|c| {
                remove_item(&mut c.files, file);
                c.files.is_empty()
            });
            if now_empty {
                self.remove_component(&component);
            }
        }

        file.reset();
    }

    fn remove_component(&mut self, component: &ComponentRef) {
        if self.components.remove(component.qualified_name()).is_none() {
            return;
        }
        let data = std::mem::take(&mut *component.write());
        for target in &data.forward_dependencies {
            ComponentObject::remove_dependency(component, target);
        }
        for source in &data.reverse_dependencies {
            ComponentObject::remove_dependency(source, component);
        }
        for ty in &data.types {
            TYPE_COMPONENT.remove(ty, component);
        }
        if let Some(package) = &data.package {
            package.with_rw_lock(|p| remove_item(&mut p.components, component));
        }
    }

    /// Removes the type with its nested types, methods and fields.
    fn remove_type(&mut self, ty: &TypeRef) {
        if self.types.remove(ty.qualified_name()).is_none() {
            return;
        }
        let data = std::mem::take(&mut *ty.write());

        for child in &data.children {
            self.remove_type(child);
        }
        for method in &data.methods {
            let key = method.with_ro_lock(|m| {
                function_key(method.qualified_name(), &m.signature, &m.template_parameters, &m.return_type)
            });
            self.methods.remove(&key);
            method.reset();
        }
        for field in &data.fields {
            self.fields.remove(field.qualified_name());
            field.reset();
        }

        for base in &data.superclasses {
            IS_A.remove(ty, base);
        }
        for derived in &data.subclasses {
            IS_A.remove(derived, ty);
        }
        for target in &data.uses_in_interface {
            USES_IN_INTERFACE.remove(ty, target);
        }
        for source in &data.reverse_uses_in_interface {
            USES_IN_INTERFACE.remove(source, ty);
        }
        for target in &data.uses_in_implementation {
            USES_IN_IMPLEMENTATION.remove(ty, target);
        }
        for source in &data.reverse_uses_in_implementation {
            USES_IN_IMPLEMENTATION.remove(source, ty);
        }
        for component in &data.components {
            TYPE_COMPONENT.remove(ty, component);
        }
        for file in &data.files {
            FILE_TYPE.remove(file, ty);
        }

        if let Some(namespace) = &data.namespace {
            namespace.with_rw_lock(|n| remove_item(&mut n.types, ty));
        }
        if let Some(package) = &data.package {
            package.with_rw_lock(|p| p.remove_type(ty));
        }
        if let Some(parent) = &data.parent {
            parent.with_rw_lock(|p| remove_item(&mut p.children, ty));
        }

        for method in self.methods.values() {
            method.with_rw_lock(|m| m.argument_types.retain(|t| !Arc::ptr_eq(t, ty)));
        }
        for field in self.fields.values() {
            field.with_rw_lock(|f| f.variable_types.retain(|t| !Arc::ptr_eq(t, ty)));
        }
    }

    fn remove_function(&mut self, function: &FunctionRef) {
        let data = std::mem::take(&mut *function.write());
        let key = function_key(
            function.qualified_name(),
            &data.signature,
            &data.template_parameters,
            &data.return_type,
        );
        self.functions.remove(&key);

        for callee in &data.callees {
            CALL.remove(function, callee);
        }
        for caller in &data.callers {
            CALL.remove(caller, function);
        }
        if let Some(namespace) = &data.namespace {
            namespace.with_rw_lock(|n| remove_item(&mut n.functions, function));
        }
        for file in self.files.values() {
            file.with_rw_lock(|f| remove_item(&mut f.global_functions, function));
        }
    }

    /// A namespace no file opens and with no nested namespace left is
    /// removed along with its members, then its parent is checked in turn.
    fn remove_namespace_if_unused(&mut self, namespace: &NamespaceRef) {
        let unused = namespace.with_ro_lock(|n| n.files.is_empty() && n.children.is_empty());
        if !unused || self.namespaces.remove(namespace.qualified_name()).is_none() {
            return;
        }
        let data = std::mem::take(&mut *namespace.write());

        for ty in &data.types {
            self.remove_type(ty);
        }
        for function in &data.functions {
            self.remove_function(function);
        }
        for variable in &data.variables {
            self.variables.remove(variable.qualified_name());
            variable.reset();
        }
        if let Some(parent) = &data.parent {
            parent.with_rw_lock(|p| remove_item(&mut p.children, namespace));
            self.remove_namespace_if_unused(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{AccessSpecifier, ErrorKind, UdtKind};
    use crate::store::{MethodDecl, ObjectStore, TypeDecl};

    fn names<T>(items: &[Arc<crate::lockable::Entity<T>>]) -> Vec<String>
    where
        T: crate::lockable::EntityState,
    {
        let mut out: Vec<String> = items.iter().map(|i| i.qualified_name().to_string()).collect();
        out.sort();
        out
    }

    fn type_decl<'a>(qualified_name: &'a str, namespace: &'a NamespaceRef) -> TypeDecl<'a> {
        TypeDecl {
            qualified_name,
            name: qualified_name.rsplit("::").next().unwrap_or(qualified_name),
            kind: UdtKind::Class,
            access: AccessSpecifier::None,
            namespace: Some(namespace),
            package: None,
            parent: None,
        }
    }

    #[test]
    fn removing_a_header_drops_its_includers_and_their_components() {
        let store = ObjectStore::new();
        let pkg = store.get_or_add_package("groups/abc/abcx", "abcx", "", None, None);
        let thing = store.get_or_add_component("groups/abc/abcx/abcx_thing", "abcx_thing", Some(&pkg));
        let user = store.get_or_add_component("groups/abc/abcx/abcx_user", "abcx_user", Some(&pkg));
        let other = store.get_or_add_component("groups/abc/abcx/abcx_other", "abcx_other", Some(&pkg));
        let header = store.get_or_add_file("groups/abc/abcx/abcx_thing.h", "abcx_thing.h", true, "1", Some(&pkg), Some(&thing));
        let source = store.get_or_add_file("groups/abc/abcx/abcx_user.cpp", "abcx_user.cpp", false, "2", Some(&pkg), Some(&user));
        store.get_or_add_file("groups/abc/abcx/abcx_other.cpp", "abcx_other.cpp", false, "3", Some(&pkg), Some(&other));
        FileObject::add_include_relation(&source, &header);
        ComponentObject::add_dependency(&user, &thing);
        ComponentObject::add_dependency(&other, &thing);
        store.get_or_add_error(ErrorKind::ParseError, "x", "bad", "groups/abc/abcx/abcx_user.cpp");

        let mut removed = store.with_rw_lock(|r| r.remove_file("groups/abc/abcx/abcx_thing.h"));
        removed.sort();
        assert_eq!(removed, vec!["groups/abc/abcx/abcx_thing.h", "groups/abc/abcx/abcx_user.cpp"]);

        let registry = store.read();
        assert_eq!(registry.files().len(), 1);
        assert!(registry.component("groups/abc/abcx/abcx_thing").is_none());
        assert!(registry.component("groups/abc/abcx/abcx_user").is_none());
        assert!(registry.errors().is_empty());
        assert!(registry.package("groups/abc/abcx").is_some());
        assert_eq!(names(pkg.read().components()), vec!["groups/abc/abcx/abcx_other"]);
        assert!(other.read().forward_dependencies().is_empty());
    }

    #[test]
    fn types_survive_while_another_file_declares_them() {
        let store = ObjectStore::new();
        let ns = store.get_or_add_namespace("abcx", "abcx", None);
        let old = store.get_or_add_file("abcx_old.h", "abcx_old.h", true, "1", None, None);
        let kept = store.get_or_add_file("abcx_kept.h", "abcx_kept.h", true, "2", None, None);
        FileObject::add_namespace(&old, &ns);
        FileObject::add_namespace(&kept, &ns);

        let gone = store.get_or_add_type(type_decl("abcx::Gone", &ns));
        let shared = store.get_or_add_type(type_decl("abcx::Shared", &ns));
        FileObject::add_type(&old, &gone);
        FileObject::add_type(&old, &shared);
        FileObject::add_type(&kept, &shared);
        TypeObject::add_uses_in_the_interface(&shared, &gone);
        store.get_or_add_method(MethodDecl {
            qualified_name: "abcx::Gone::run",
            name: "run",
            signature: "run()",
            return_type: "void",
            template_parameters: "",
            access: AccessSpecifier::Public,
            flags: MethodFlags::default(),
            parent: Some(&gone),
        });
        let take = store.get_or_add_method(MethodDecl {
            qualified_name: "abcx::Shared::take",
            name: "take",
            signature: "take(abcx::Gone)",
            return_type: "void",
            template_parameters: "",
            access: AccessSpecifier::Public,
            flags: MethodFlags::default(),
            parent: Some(&shared),
        });
        take.with_rw_lock(|m| m.add_argument_type(&gone));

        store.with_rw_lock(|r| r.remove_file("abcx_old.h"));

        let registry = store.read();
        assert!(registry.type_("abcx::Gone").is_none());
        assert_eq!(registry.methods().len(), 1);
        assert!(registry.namespace("abcx").is_some());
        assert_eq!(names(ns.read().types()), vec!["abcx::Shared"]);
        assert_eq!(names(shared.read().files()), vec!["abcx_kept.h"]);
        assert!(shared.read().uses_in_the_interface().is_empty());
        assert!(take.read().argument_types().is_empty());
    }

    #[test]
    fn namespaces_no_file_opens_are_removed_up_the_chain() {
        let store = ObjectStore::new();
        let outer = store.get_or_add_namespace("abc", "abc", None);
        let inner = store.get_or_add_namespace("abc::abcx", "abcx", Some(&outer));
        let file = store.get_or_add_file("abcx_thing.h", "abcx_thing.h", true, "1", None, None);
        FileObject::add_namespace(&file, &inner);

        store.with_rw_lock(|r| r.remove_file("abcx_thing.h"));

        let registry = store.read();
        assert!(registry.namespaces().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_file_removes_nothing() {
        let store = ObjectStore::new();
        store.get_or_add_file("a.h", "a.h", true, "", None, None);
        assert!(store.with_rw_lock(|r| r.remove_file("b.h")).is_empty());
        assert_eq!(store.files().len(), 1);
    }
}
