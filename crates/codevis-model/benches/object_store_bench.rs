//! Criterion benchmarks for the object store: registration and edge insertion.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use codevis_model::dump::dump_to_string;
use codevis_model::{ObjectStore, PackageObject};

fn populated(count: usize) -> ObjectStore {
    let store = ObjectStore::new();
    let pkgs: Vec<_> = (0..count)
        .map(|i| {
            let qn = format!("groups/grp/pkg{i}");
            store.get_or_add_package(&qn, &qn, "", None, None)
        })
        .collect();
    for window in pkgs.windows(2) {
        PackageObject::add_dependency(&window[0], &window[1]);
    }
    store
}

fn bench_object_store(c: &mut Criterion) {
    c.bench_function("get_or_add_package_1000", |bench| {
        bench.iter(|| black_box(populated(1000)));
    });

    let store = populated(1000);
    c.bench_function("lookup_existing_package", |bench| {
        bench.iter(|| black_box(store.package("groups/grp/pkg500")));
    });

    c.bench_function("dump_1000_packages", |bench| {
        bench.iter(|| black_box(dump_to_string(&store)));
    });
}

criterion_group!(benches, bench_object_store);
criterion_main!(benches);
