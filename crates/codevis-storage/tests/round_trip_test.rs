//! Writing a store and reading it back reproduces the same dump.

use std::path::Path;

use codevis_model::dump::dump_to_string;
use codevis_model::store::{FieldDecl, FunctionDecl, MethodDecl, TypeDecl};
use codevis_model::{
    AccessSpecifier, ComponentObject, ErrorKind, FileObject, FunctionObject, MethodFlags, ObjectStore,
    PackageObject, TypeObject, UdtKind,
};
use codevis_storage::{SqliteReader, SqliteWriter};

fn populated_store() -> ObjectStore {
    let store = ObjectStore::new();
    let repo = store.get_or_add_repository("bde", "/src/bde");
    let grp = store.get_or_add_package("groups/bsl", "bsl", "/src/bde/groups/bsl", None, Some(&repo));
    let bslma = store.get_or_add_package("groups/bsl/bslma", "bslma", "", Some(&grp), Some(&repo));
    let bslstl = store.get_or_add_package("groups/bsl/bslstl", "bslstl", "", Some(&grp), Some(&repo));
    PackageObject::add_dependency(&bslstl, &bslma);

    let alloc = store.get_or_add_component("groups/bsl/bslma/bslma_allocator", "bslma_allocator", Some(&bslma));
    let vector = store.get_or_add_component("groups/bsl/bslstl/bslstl_vector", "bslstl_vector", Some(&bslstl));
    ComponentObject::add_dependency(&vector, &alloc);

    let alloc_h = store.get_or_add_file(
        "groups/bsl/bslma/bslma_allocator.h",
        "bslma_allocator.h",
        true,
        "aa11",
        Some(&bslma),
        Some(&alloc),
    );
    let vector_h = store.get_or_add_file(
        "groups/bsl/bslstl/bslstl_vector.h",
        "bslstl_vector.h",
        true,
        "bb22",
        Some(&bslstl),
        Some(&vector),
    );
    FileObject::add_include_relation(&vector_h, &alloc_h);

    let bsl = store.get_or_add_namespace("bsl", "bsl", None);
    let bslma_ns = store.get_or_add_namespace("bsl::bslma", "bslma", Some(&bsl));
    FileObject::add_namespace(&alloc_h, &bslma_ns);

    let allocator = store.get_or_add_type(TypeDecl {
        qualified_name: "bsl::bslma::Allocator",
        name: "Allocator",
        kind: UdtKind::Class,
        access: AccessSpecifier::None,
        namespace: Some(&bslma_ns),
        package: Some(&bslma),
        parent: None,
    });
    let vec_ty = store.get_or_add_type(TypeDecl {
        qualified_name: "bsl::vector",
        name: "vector",
        kind: UdtKind::Class,
        access: AccessSpecifier::None,
        namespace: Some(&bsl),
        package: Some(&bslstl),
        parent: None,
    });
    let proxy = store.get_or_add_type(TypeDecl {
        qualified_name: "bsl::vector::Proxy",
        name: "Proxy",
        kind: UdtKind::Struct,
        access: AccessSpecifier::Private,
        namespace: Some(&bsl),
        package: Some(&bslstl),
        parent: Some(&vec_ty),
    });
    FileObject::add_type(&alloc_h, &allocator);
    FileObject::add_type(&vector_h, &vec_ty);
    TypeObject::add_component(&allocator, &alloc);
    TypeObject::add_uses_in_the_interface(&vec_ty, &allocator);
    TypeObject::add_uses_in_the_implementation(&proxy, &allocator);
    TypeObject::add_is_a(&proxy, &vec_ty);

    let method = store.get_or_add_method(MethodDecl {
        qualified_name: "bsl::vector::push_back",
        name: "push_back",
        signature: "push_back(const T&)",
        return_type: "void",
        template_parameters: "",
        access: AccessSpecifier::Public,
        flags: MethodFlags::default(),
        parent: Some(&vec_ty),
    });
    method.with_rw_lock(|m| m.add_argument_type(&allocator));
    let field = store.get_or_add_field(FieldDecl {
        qualified_name: "bsl::vector::d_allocator_p",
        name: "d_allocator_p",
        signature: "Allocator *",
        access: AccessSpecifier::Private,
        is_static: false,
        parent: Some(&vec_ty),
    });
    field.with_rw_lock(|f| f.add_variable_type(&allocator));

    let caller = store.get_or_add_function(FunctionDecl {
        qualified_name: "bsl::swap",
        name: "swap",
        signature: "swap(vector&, vector&)",
        return_type: "void",
        template_parameters: "",
        namespace: Some(&bsl),
    });
    let callee = store.get_or_add_function(FunctionDecl {
        qualified_name: "bsl::bslma::allocate",
        name: "allocate",
        signature: "allocate(size_t)",
        return_type: "void *",
        template_parameters: "",
        namespace: Some(&bslma_ns),
    });
    FunctionObject::add_dependency(&caller, &callee);
    vector_h.with_rw_lock(|f| f.add_global_function(&caller));

    store.get_or_add_error(ErrorKind::ParseError, "bslstl_vector.h", "expected ';'", "bslstl_vector.h");
    store
}

fn write(store: &ObjectStore, path: &Path) {
    let mut writer = SqliteWriter::create_or_open(path).unwrap();
    store.write_to_database(&mut writer).unwrap();
}

fn read(path: &Path) -> ObjectStore {
    let store = ObjectStore::new();
    store.read_from_database(&SqliteReader::new(), path).unwrap();
    store
}

#[test]
fn dump_survives_write_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.db");
    let original = populated_store();
    write(&original, &path);

    let restored = read(&path);
    assert_eq!(dump_to_string(&original), dump_to_string(&restored));
}

#[test]
fn edges_not_in_the_dump_survive_too() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.db");
    write(&populated_store(), &path);
    let restored = read(&path);

    let registry = restored.read();
    let swap = registry
        .function("bsl::swap", "swap(vector&, vector&)", "", "void")
        .unwrap();
    assert_eq!(swap.read().callees().len(), 1);
    assert_eq!(swap.read().callees()[0].qualified_name(), "bsl::bslma::allocate");

    let vector_h = registry.file("groups/bsl/bslstl/bslstl_vector.h").unwrap();
    assert_eq!(vector_h.read().global_functions().len(), 1);

    let field = registry.field("bsl::vector::d_allocator_p").unwrap();
    assert_eq!(field.read().variable_types()[0].qualified_name(), "bsl::bslma::Allocator");

    let vector = registry.component("groups/bsl/bslstl/bslstl_vector").unwrap();
    assert_eq!(vector.read().forward_dependencies().len(), 1);

    let proxy = registry.type_("bsl::vector::Proxy").unwrap();
    assert_eq!(proxy.read().access, AccessSpecifier::Private);
    assert_eq!(proxy.read().kind, UdtKind::Struct);

    assert_eq!(registry.errors().len(), 1);
    assert_eq!(registry.repositories().len(), 1);
}

#[test]
fn writing_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("code.db");
    let original = populated_store();
    write(&original, &path);
    write(&original, &path);

    let restored = read(&path);
    assert_eq!(dump_to_string(&original), dump_to_string(&restored));
    assert_eq!(restored.read().errors().len(), 1);
}

#[test]
fn empty_store_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.db");
    write(&ObjectStore::new(), &path);

    let restored = read(&path);
    assert!(restored.read().is_empty());
    assert_eq!(dump_to_string(&restored), "SOURCE FILES:\nPACKAGES:\nCLASSES:\n");
}
