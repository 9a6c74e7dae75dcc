//! File ownership resolution for types declared in several files.
//!
//! Runs once after every translation unit has been scanned. Each type seen in
//! two or more files is given exactly one: the file whose name carries
//! `<namespace>_<type>.`, or else the file name closest to the type name by
//! edit distance. The type's component and package follow the chosen file.

mod levenshtein;

use std::sync::Arc;

use codevis_core::tracing::metrics;
use codevis_core::Diagnostics;
use codevis_model::{FileRef, ObjectStore, TypeObject, TypeRef};
use tracing::info;

pub use levenshtein::levenshtein;

/// Index into `candidates` of the file that should own a type named
/// `type_name`. `namespace` is the local name of the type's namespace.
/// Ties go to the earlier candidate. None only for an empty slice.
pub fn pick_owner<S: AsRef<str>>(type_name: &str, namespace: Option<&str>, candidates: &[S]) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    let lowered = type_name.to_lowercase();
    if let Some(namespace) = namespace {
        let expected = format!("{namespace}_{lowered}.");
        if let Some(index) = candidates.iter().position(|c| c.as_ref().contains(&expected)) {
            return Some(index);
        }
    }

    let mut best = 0;
    let mut best_distance = usize::MAX;
    for (index, candidate) in candidates.iter().enumerate() {
        let distance = levenshtein(&lowered, candidate.as_ref());
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    Some(best)
}

/// Gives `ty` `file` as its only file, and the file's component and package.
pub fn set_udt_file(ty: &TypeRef, file: &FileRef) {
    let (package, component) = file.with_ro_lock(|f| (f.package().cloned(), f.component().cloned()));
    TypeObject::set_unique_file(ty, file);
    TypeObject::set_unique_component(ty, component.as_ref());
    TypeObject::set_package(ty, package.as_ref());
}

/// Resolves one type. Returns the chosen file when the type had to change.
fn fix_udt(ty: &TypeRef, diagnostics: &Diagnostics) -> Option<FileRef> {
    let (mut files, namespace) = ty.with_ro_lock(|t| (t.files().to_vec(), t.namespace().cloned()));
    match files.len() {
        0 => {
            diagnostics.warn(&format!("UDT {} has no source files", ty.qualified_name()));
            return None;
        }
        1 => return None,
        _ => {}
    }

    // Candidate order must not depend on scan scheduling.
    files.sort_by(|a, b| a.qualified_name().cmp(b.qualified_name()));
    let names: Vec<&str> = files.iter().map(|f| f.name()).collect();
    let index = pick_owner(ty.name(), namespace.as_ref().map(|n| n.name()), &names)?;
    let owner = Arc::clone(&files[index]);
    set_udt_file(ty, &owner);
    diagnostics.debug(|| format!("Set file for {} to {}", ty.qualified_name(), owner.qualified_name()));
    Some(owner)
}

/// Runs resolution over every type in the store. Never fails on data: types
/// without files only produce a warning.
pub fn postprocess(store: &ObjectStore, diagnostics: &Diagnostics) -> bool {
    let types = store.types();
    let resolved = types.iter().filter_map(|ty| fix_udt(ty, diagnostics)).count();
    info!(
        types = types.len(),
        { metrics::TYPES_RESOLVED } = resolved,
        "logical post-processing done"
    );
    true
}
