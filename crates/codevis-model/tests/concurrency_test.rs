//! Concurrent registration and edge insertion from many threads.

use std::sync::{Arc, Barrier};
use std::thread;

use codevis_model::store::TypeDecl;
use codevis_model::{AccessSpecifier, ObjectStore, PackageObject, TypeObject, UdtKind};

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn edges_in_both_orders_do_not_deadlock() {
    let store = Arc::new(ObjectStore::new());
    let names: Vec<String> = (0..6).map(|i| format!("pkg{i}")).collect();
    for name in &names {
        store.get_or_add_package(name, name, "", None, None);
    }

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let names = names.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let i = (t + round) % names.len();
                    let j = (t * 7 + round * 3 + 1) % names.len();
                    let a = store.package(&names[i]).unwrap();
                    let b = store.package(&names[j]).unwrap();
                    // Even threads go a -> b, odd threads b -> a.
                    if t % 2 == 0 {
                        PackageObject::add_dependency(&a, &b);
                    } else {
                        PackageObject::add_dependency(&b, &a);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for pkg in store.packages() {
        let data = pkg.read();
        for dep in data.forward_dependencies() {
            let back = dep.read();
            assert!(
                back.reverse_dependencies().iter().any(|r| Arc::ptr_eq(r, &pkg)),
                "{} -> {} has no reverse edge",
                pkg.qualified_name(),
                dep.qualified_name()
            );
        }
    }
}

#[test]
fn concurrent_get_or_add_yields_one_entity() {
    let store = Arc::new(ObjectStore::new());
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..50)
                    .map(|i| {
                        let qn = format!("ns::T{i}");
                        store.get_or_add_type(TypeDecl {
                            qualified_name: &qn,
                            name: &qn,
                            kind: UdtKind::Class,
                            access: AccessSpecifier::None,
                            namespace: None,
                            package: None,
                            parent: None,
                        })
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(store.types().len(), 50);
    for other in &results[1..] {
        for (a, b) in results[0].iter().zip(other) {
            assert!(Arc::ptr_eq(a, b));
        }
    }
}

#[test]
fn symmetric_type_edges_under_contention() {
    let store = Arc::new(ObjectStore::new());
    let types: Vec<_> = (0..4)
        .map(|i| {
            let qn = format!("T{i}");
            store.get_or_add_type(TypeDecl {
                qualified_name: &qn,
                name: &qn,
                kind: UdtKind::Class,
                access: AccessSpecifier::None,
                namespace: None,
                package: None,
                parent: None,
            })
        })
        .collect();
    let types = Arc::new(types);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let types = Arc::clone(&types);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let a = &types[(t + round) % 4];
                    let b = &types[(t + round + 1 + t % 3) % 4];
                    TypeObject::add_uses_in_the_interface(a, b);
                    TypeObject::add_uses_in_the_interface(b, a);
                    if round % 5 == 0 {
                        TypeObject::remove_uses_in_the_interface(a, b);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for ty in types.iter() {
        for target in ty.read().uses_in_the_interface().iter() {
            assert!(target
                .read()
                .reverse_uses_in_the_interface()
                .iter()
                .any(|r| Arc::ptr_eq(r, ty)));
        }
        for source in ty.read().reverse_uses_in_the_interface().iter() {
            assert!(source
                .read()
                .uses_in_the_interface()
                .iter()
                .any(|r| Arc::ptr_eq(r, ty)));
        }
    }
}
