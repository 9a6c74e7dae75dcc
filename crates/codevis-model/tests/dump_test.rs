//! Dump output is independent of insertion order.

use codevis_model::dump::dump_to_string;
use codevis_model::store::{MethodDecl, TypeDecl};
use codevis_model::{AccessSpecifier, FileObject, MethodFlags, ObjectStore, PackageObject, TypeObject, UdtKind};

fn build(reverse: bool) -> ObjectStore {
    let store = ObjectStore::new();
    let mut pkgs = vec!["groups/bsl/bslma", "groups/bsl/bsls", "groups/bdl/bdlt"];
    if reverse {
        pkgs.reverse();
    }
    for qn in &pkgs {
        let name = qn.rsplit('/').next().unwrap();
        store.get_or_add_package(qn, name, "", None, None);
    }
    let ma = store.package("groups/bsl/bslma").unwrap();
    let ls = store.package("groups/bsl/bsls").unwrap();
    let dt = store.package("groups/bdl/bdlt").unwrap();
    if reverse {
        PackageObject::add_dependency(&ma, &ls);
        PackageObject::add_dependency(&dt, &ls);
        PackageObject::add_dependency(&dt, &ma);
    } else {
        PackageObject::add_dependency(&dt, &ma);
        PackageObject::add_dependency(&dt, &ls);
        PackageObject::add_dependency(&ma, &ls);
    }

    let header = store.get_or_add_file("bsl/bslma/bslma_allocator.h", "bslma_allocator.h", true, "", Some(&ma), None);
    let source = store.get_or_add_file("bsl/bslma/bslma_allocator.cpp", "bslma_allocator.cpp", false, "", Some(&ma), None);
    FileObject::add_include_relation(&source, &header);

    let ns = store.get_or_add_namespace("BloombergLP", "BloombergLP", None);
    let class = |qn: &str| {
        store.get_or_add_type(TypeDecl {
            qualified_name: qn,
            name: qn,
            kind: UdtKind::Class,
            access: AccessSpecifier::None,
            namespace: Some(&ns),
            package: Some(&ma),
            parent: None,
        })
    };
    let (alloc, other) = if reverse {
        let o = class("BloombergLP::bslma::Other");
        (class("BloombergLP::bslma::Allocator"), o)
    } else {
        let a = class("BloombergLP::bslma::Allocator");
        (a, class("BloombergLP::bslma::Other"))
    };
    FileObject::add_type(&header, &alloc);
    TypeObject::add_uses_in_the_interface(&other, &alloc);

    let mut sigs = vec!["allocate(size_t)", "allocate(size_t, int)"];
    if reverse {
        sigs.reverse();
    }
    for sig in sigs {
        store.get_or_add_method(MethodDecl {
            qualified_name: "BloombergLP::bslma::Allocator::allocate",
            name: "allocate",
            signature: sig,
            return_type: "void *",
            template_parameters: "",
            access: AccessSpecifier::Public,
            flags: MethodFlags {
                is_virtual: true,
                ..Default::default()
            },
            parent: Some(&alloc),
        });
    }
    store
}

#[test]
fn dump_is_insertion_order_independent() {
    assert_eq!(dump_to_string(&build(false)), dump_to_string(&build(true)));
}

#[test]
fn package_section_lists_sorted_dependencies() {
    let text = dump_to_string(&build(true));
    let expected = "  groups/bdl/bdlt\n    DEPENDENCIES:\n      groups/bsl/bslma\n      groups/bsl/bsls\n\n";
    assert!(text.contains(expected), "{text}");
}

#[test]
fn class_section_carries_relationships() {
    let text = dump_to_string(&build(false));
    assert!(text.contains("  BloombergLP::bslma::Other\n    NAMESPACE: BloombergLP\n    PACKAGE: groups/bsl/bslma\n    USES-IN-THE-INTERFACE RELATIONSHIPS:\n      BloombergLP::bslma::Allocator\n"));
    assert!(text.contains("    METHODS:\n      BloombergLP::bslma::Allocator::allocate\n      BloombergLP::bslma::Allocator::allocate\n"));
}
