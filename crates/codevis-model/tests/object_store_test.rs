//! Object store registration, relationship symmetry and qualified-name uniqueness.

use std::sync::Arc;

use codevis_model::store::TypeDecl;
use codevis_model::{
    AccessSpecifier, ComponentObject, FileObject, ObjectStore, PackageObject, TypeObject, TypeRef, UdtKind,
};
use proptest::prelude::*;

fn add_class(store: &ObjectStore, qualified_name: &str) -> TypeRef {
    store.get_or_add_type(TypeDecl {
        qualified_name,
        name: qualified_name,
        kind: UdtKind::Class,
        access: AccessSpecifier::None,
        namespace: None,
        package: None,
        parent: None,
    })
}

#[test]
fn peer_edges_are_recorded_on_both_sides() {
    let store = ObjectStore::new();
    let a = add_class(&store, "A");
    let b = add_class(&store, "B");

    assert!(TypeObject::add_uses_in_the_implementation(&a, &b));
    assert!(!TypeObject::add_uses_in_the_implementation(&a, &b));

    assert_eq!(a.read().uses_in_the_implementation().len(), 1);
    assert!(Arc::ptr_eq(&b.read().reverse_uses_in_the_implementation()[0], &a));
    assert!(b.read().uses_in_the_implementation().is_empty());

    assert!(TypeObject::remove_uses_in_the_implementation(&a, &b));
    assert!(a.read().uses_in_the_implementation().is_empty());
    assert!(b.read().reverse_uses_in_the_implementation().is_empty());
}

#[test]
fn self_edges_are_ignored() {
    let store = ObjectStore::new();
    let pkg = store.get_or_add_package("pkg", "pkg", "", None, None);
    assert!(!PackageObject::add_dependency(&pkg, &pkg));
    assert!(pkg.read().forward_dependencies().is_empty());

    let a = add_class(&store, "A");
    assert!(!TypeObject::add_is_a(&a, &a));
    assert!(a.read().superclasses().is_empty());
}

#[test]
fn include_relations_can_be_removed() {
    let store = ObjectStore::new();
    let source = store.get_or_add_file("a.cpp", "a.cpp", false, "", None, None);
    let header = store.get_or_add_file("a.h", "a.h", true, "", None, None);

    assert!(FileObject::add_include_relation(&source, &header));
    assert_eq!(header.read().reverse_includes()[0].qualified_name(), "a.cpp");
    assert!(FileObject::remove_include_relation(&source, &header));
    assert!(!FileObject::remove_include_relation(&source, &header));
    assert!(source.read().forward_includes().is_empty());
    assert!(header.read().reverse_includes().is_empty());
}

#[test]
fn is_a_links_superclasses_and_subclasses() {
    let store = ObjectStore::new();
    let derived = add_class(&store, "Derived");
    let base = add_class(&store, "Base");
    TypeObject::add_is_a(&derived, &base);
    assert_eq!(derived.read().superclasses()[0].qualified_name(), "Base");
    assert_eq!(base.read().subclasses()[0].qualified_name(), "Derived");
}

#[test]
fn set_unique_file_detaches_other_files() {
    let store = ObjectStore::new();
    let ty = add_class(&store, "ns::Thing");
    let first = store.get_or_add_file("a/first.h", "first.h", true, "", None, None);
    let second = store.get_or_add_file("a/second.h", "second.h", true, "", None, None);
    FileObject::add_type(&first, &ty);
    FileObject::add_type(&second, &ty);
    assert_eq!(ty.read().files().len(), 2);

    TypeObject::set_unique_file(&ty, &second);
    assert_eq!(ty.read().files().len(), 1);
    assert!(Arc::ptr_eq(&ty.read().files()[0], &second));
    assert!(first.read().types().is_empty());
}

#[test]
fn set_package_moves_type_between_packages() {
    let store = ObjectStore::new();
    let old = store.get_or_add_package("old", "old", "", None, None);
    let new = store.get_or_add_package("new", "new", "", None, None);
    let ty = store.get_or_add_type(TypeDecl {
        qualified_name: "T",
        name: "T",
        kind: UdtKind::Struct,
        access: AccessSpecifier::None,
        namespace: None,
        package: Some(&old),
        parent: None,
    });
    assert_eq!(old.read().types().len(), 1);

    TypeObject::set_package(&ty, Some(&new));
    assert!(old.read().types().is_empty());
    assert_eq!(new.read().types().len(), 1);
    assert!(Arc::ptr_eq(ty.read().package().unwrap(), &new));
}

#[test]
fn component_dependency_round_trip() {
    let store = ObjectStore::new();
    let x = store.get_or_add_component("pkga/x", "x", None);
    let y = store.get_or_add_component("pkgb/y", "y", None);
    ComponentObject::add_dependency(&x, &y);
    assert_eq!(y.read().reverse_dependencies()[0].qualified_name(), "pkga/x");
    ComponentObject::remove_dependency(&x, &y);
    assert!(x.read().forward_dependencies().is_empty());
    assert!(y.read().reverse_dependencies().is_empty());
}

proptest! {
    #[test]
    fn one_entity_per_qualified_name(names in prop::collection::vec("[a-c]{1,3}", 1..40)) {
        let store = ObjectStore::new();
        let handles: Vec<_> = names
            .iter()
            .map(|n| store.get_or_add_package(n, n, "", None, None))
            .collect();

        let mut distinct = names.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(store.packages().len(), distinct.len());

        for (name, handle) in names.iter().zip(&handles) {
            let stored = store.package(name).unwrap();
            prop_assert!(Arc::ptr_eq(&stored, handle));
        }
    }
}
