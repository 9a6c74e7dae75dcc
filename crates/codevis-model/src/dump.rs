//! Deterministic text dump of a store, for diffing two databases.
//!
//! The store read lock is held for the whole dump. Every section and every
//! related-entity list is sorted by qualified name, so stores with the same
//! content produce byte-identical output regardless of insertion order.

use std::io::{self, Write};
use std::sync::Arc;

use crate::entities::*;
use crate::lockable::{Entity, EntityState};
use crate::store::{ObjectStore, Registry};

fn sorted_names<T: EntityState>(items: &[Arc<Entity<T>>]) -> Vec<&str> {
    let mut names: Vec<&str> = items.iter().map(|e| e.qualified_name()).collect();
    names.sort_unstable();
    names
}

fn write_list(out: &mut dyn Write, header: &str, names: &[&str]) -> io::Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(out, "    {header}:")?;
    for name in names {
        writeln!(out, "      {name}")?;
    }
    Ok(())
}

fn write_file(out: &mut dyn Write, file: &FileObject) -> io::Result<()> {
    let data = file.read();
    writeln!(out, "  {}", file.qualified_name())?;
    if let Some(parent) = data.package() {
        writeln!(out, "    PARENT: {}", parent.qualified_name())?;
    }
    write_list(out, "NAMESPACES", &sorted_names(data.namespaces()))?;
    write_list(out, "CLASSES", &sorted_names(data.types()))?;
    write_list(out, "INCLUDES", &sorted_names(data.forward_includes()))?;
    writeln!(out)
}

fn write_package(out: &mut dyn Write, package: &PackageObject) -> io::Result<()> {
    let data = package.read();
    writeln!(out, "  {}", package.qualified_name())?;
    if let Some(parent) = data.parent() {
        writeln!(out, "    PARENT: {}", parent.qualified_name())?;
    }
    write_list(out, "CLASSES", &sorted_names(data.types()))?;
    write_list(out, "DEPENDENCIES", &sorted_names(data.forward_dependencies()))?;
    write_list(out, "COMPONENTS", &sorted_names(data.components()))?;
    writeln!(out)
}

fn write_class(out: &mut dyn Write, class: &TypeObject) -> io::Result<()> {
    let data = class.read();
    writeln!(out, "  {}", class.qualified_name())?;
    write_list(out, "FILES", &sorted_names(data.files()))?;
    if let Some(namespace) = data.namespace() {
        writeln!(out, "    NAMESPACE: {}", namespace.qualified_name())?;
    }
    if let Some(package) = data.package() {
        writeln!(out, "    PACKAGE: {}", package.qualified_name())?;
    }
    if let Some(parent) = data.parent() {
        writeln!(out, "    PARENT CLASS: {}", parent.qualified_name())?;
    }
    write_list(out, "IS-A RELATIONSHPS", &sorted_names(data.superclasses()))?;
    write_list(
        out,
        "USES-IN-THE-INTERFACE RELATIONSHIPS",
        &sorted_names(data.uses_in_the_interface()),
    )?;
    write_list(
        out,
        "USES-IN-THE-IMPLEMENTATION RELATIONSHIPS",
        &sorted_names(data.uses_in_the_implementation()),
    )?;

    // Overloads share a qualified name; the signature keeps the order total.
    let mut methods: Vec<(String, String)> = data
        .methods()
        .iter()
        .map(|m| (m.qualified_name().to_string(), m.read().signature.clone()))
        .collect();
    methods.sort_unstable();
    let method_names: Vec<&str> = methods.iter().map(|(name, _)| name.as_str()).collect();
    write_list(out, "METHODS", &method_names)?;

    write_list(out, "FIELDS", &sorted_names(data.fields()))?;
    writeln!(out)
}

/// Writes the report for an already-locked registry.
pub fn dump_registry(registry: &Registry, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "SOURCE FILES:")?;
    for file in registry.sorted_files() {
        write_file(out, &file)?;
    }
    writeln!(out, "PACKAGES:")?;
    for package in registry.sorted_packages() {
        write_package(out, &package)?;
    }
    writeln!(out, "CLASSES:")?;
    for class in registry.sorted_types() {
        write_class(out, &class)?;
    }
    Ok(())
}

pub fn dump_store(store: &ObjectStore, out: &mut dyn Write) -> io::Result<()> {
    let registry = store.read();
    dump_registry(&registry, out)
}

pub fn dump_to_string(store: &ObjectStore) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = dump_store(store, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
