//! Type dependencies routed through free functions.
//!
//! Within one translation unit, a type that calls a free function depends on
//! every type that function (or anything it calls) uses. Facts are gathered
//! while the unit is visited and flattened into type-to-type edges at the end.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use codevis_core::types::collections::{FxHashMap, FxHashSet};
use codevis_model::{FunctionObject, FunctionRef, TypeObject, TypeRef};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Identity of a function within one translation unit.
pub type FnId = u64;

/// Hashes `template <params> qualified::name(param types)` so overloads and
/// specialisations stay apart without keeping the strings.
pub fn fn_id(template_parameters: &str, qualified_name: &str, parameter_types: &[String]) -> FnId {
    let mut key = String::new();
    if !template_parameters.is_empty() {
        key.push_str("template ");
        key.push_str(template_parameters);
        key.push(' ');
    }
    key.push_str(qualified_name);
    key.push('(');
    key.push_str(&parameter_types.join(", "));
    key.push(')');
    xxh3_64(key.as_bytes())
}

/// Hash and equality by address.
#[derive(Debug)]
struct ByAddress<T>(Arc<T>);

impl<T> Clone for ByAddress<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> PartialEq for ByAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Eq for ByAddress<T> {}

impl<T> Hash for ByAddress<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

#[derive(Debug, Default)]
pub struct StaticFnHandler {
    fn_dep_udt: FxHashMap<FnId, FxHashSet<ByAddress<TypeObject>>>,
    fn_dep_fn: FxHashMap<FnId, FxHashSet<FnId>>,
    udt_dep_fn: FxHashMap<ByAddress<TypeObject>, FxHashSet<FnId>>,
    callgraph_deps: FxHashMap<ByAddress<FunctionObject>, FxHashSet<ByAddress<FunctionObject>>>,
    visited: FxHashSet<FnId>,
    in_progress: FxHashSet<FnId>,
}

impl StaticFnHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `function` names `udt` directly.
    pub fn add_fn_uses_udt(&mut self, function: FnId, udt: &TypeRef) {
        self.fn_dep_udt
            .entry(function)
            .or_default()
            .insert(ByAddress(Arc::clone(udt)));
    }

    /// `function` calls `callee`. Self-calls are dropped.
    pub fn add_fn_uses_fn(&mut self, function: FnId, callee: FnId) {
        if function != callee {
            self.fn_dep_fn.entry(function).or_default().insert(callee);
        }
    }

    /// Call edge between two registered functions.
    pub fn add_callgraph_dep(&mut self, source: Option<&FunctionRef>, target: Option<&FunctionRef>) {
        let (Some(source), Some(target)) = (source, target) else {
            return;
        };
        if Arc::ptr_eq(source, target) {
            return;
        }
        self.callgraph_deps
            .entry(ByAddress(Arc::clone(source)))
            .or_default()
            .insert(ByAddress(Arc::clone(target)));
    }

    /// `udt` calls `function`.
    pub fn add_udt_uses(&mut self, udt: &TypeRef, function: FnId) {
        self.udt_dep_fn
            .entry(ByAddress(Arc::clone(udt)))
            .or_default()
            .insert(function);
    }

    /// Folds the types used by everything `source` calls into `source`.
    ///
    /// A function is flattened at most once; when a call cycle leads back to
    /// a function still being flattened the cycle is cut there, so mutually
    /// recursive functions may see only part of each other's types.
    pub fn flatten_fn(&mut self, source: FnId) {
        if !self.visited.insert(source) {
            if self.in_progress.contains(&source) {
                debug!(function = source, "call cycle truncated");
            }
            return;
        }
        self.in_progress.insert(source);

        let callees: Vec<FnId> = self
            .fn_dep_fn
            .get(&source)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for callee in callees {
            if callee == source {
                continue;
            }
            self.flatten_fn(callee);
            let inherited: Vec<ByAddress<TypeObject>> = self
                .fn_dep_udt
                .get(&callee)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default();
            if !inherited.is_empty() {
                self.fn_dep_udt.entry(source).or_default().extend(inherited);
            }
        }

        self.in_progress.remove(&source);
    }

    /// Writes call edges, then the flattened type edges. Returns the number
    /// of new uses-in-the-implementation edges.
    pub fn write_out_to_db(&mut self) -> usize {
        for (source, targets) in &self.callgraph_deps {
            for target in targets {
                FunctionObject::add_dependency(&source.0, &target.0);
            }
        }

        if self.udt_dep_fn.is_empty() || self.fn_dep_udt.is_empty() {
            return 0;
        }

        let sources: Vec<FnId> = self.fn_dep_fn.keys().copied().collect();
        for source in sources {
            self.flatten_fn(source);
        }

        let mut added = 0;
        for (udt, functions) in &self.udt_dep_fn {
            for function in functions {
                let Some(targets) = self.fn_dep_udt.get(function) else {
                    continue;
                };
                for target in targets {
                    if TypeObject::add_uses_in_the_implementation(&udt.0, &target.0) {
                        added += 1;
                    }
                }
            }
        }
        added
    }

    pub fn reset(&mut self) {
        self.fn_dep_udt.clear();
        self.fn_dep_fn.clear();
        self.udt_dep_fn.clear();
        self.callgraph_deps.clear();
        self.visited.clear();
        self.in_progress.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.fn_dep_udt.is_empty()
            && self.fn_dep_fn.is_empty()
            && self.udt_dep_fn.is_empty()
            && self.callgraph_deps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use codevis_model::store::{FunctionDecl, TypeDecl};
    use codevis_model::{AccessSpecifier, ObjectStore, UdtKind};

    use super::*;

    fn udt(store: &ObjectStore, name: &str) -> TypeRef {
        store.get_or_add_type(TypeDecl {
            qualified_name: name,
            name,
            kind: UdtKind::Class,
            access: AccessSpecifier::None,
            namespace: None,
            package: None,
            parent: None,
        })
    }

    fn function(store: &ObjectStore, name: &str) -> FunctionRef {
        store.get_or_add_function(FunctionDecl {
            qualified_name: name,
            name,
            signature: "()",
            return_type: "void",
            template_parameters: "",
            namespace: None,
        })
    }

    fn impl_names(ty: &TypeRef) -> Vec<String> {
        let mut names: Vec<String> = ty
            .read()
            .uses_in_the_implementation()
            .iter()
            .map(|t| t.qualified_name().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn ids_separate_overloads_and_templates() {
        let a = fn_id("", "ns::f", &["int".to_string()]);
        let b = fn_id("", "ns::f", &["double".to_string()]);
        let c = fn_id("<typename T>", "ns::f", &["int".to_string()]);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, fn_id("", "ns::f", &["int".to_string()]));
    }

    #[test]
    fn method_calling_free_function_depends_on_its_types() {
        let store = ObjectStore::new();
        let (type_a, type_b) = (udt(&store, "typeA"), udt(&store, "typeB"));
        let f = fn_id("", "f", &[]);

        let mut handler = StaticFnHandler::new();
        handler.add_udt_uses(&type_a, f);
        handler.add_fn_uses_udt(f, &type_b);
        handler.add_fn_uses_fn(f, f);
        assert_eq!(handler.write_out_to_db(), 1);

        assert_eq!(impl_names(&type_a), vec!["typeB"]);
        assert_eq!(type_b.read().reverse_uses_in_the_implementation().len(), 1);
    }

    #[test]
    fn types_flow_along_call_chains() {
        let store = ObjectStore::new();
        let (a, b, c) = (udt(&store, "A"), udt(&store, "B"), udt(&store, "C"));
        let (f, g, h) = (fn_id("", "f", &[]), fn_id("", "g", &[]), fn_id("", "h", &[]));

        let mut handler = StaticFnHandler::new();
        handler.add_udt_uses(&a, f);
        handler.add_fn_uses_fn(f, g);
        handler.add_fn_uses_fn(g, h);
        handler.add_fn_uses_udt(g, &b);
        handler.add_fn_uses_udt(h, &c);
        handler.write_out_to_db();

        assert_eq!(impl_names(&a), vec!["B", "C"]);
    }

    #[test]
    fn call_cycles_terminate() {
        let store = ObjectStore::new();
        let (a, b) = (udt(&store, "A"), udt(&store, "B"));
        let (f, g) = (fn_id("", "f", &[]), fn_id("", "g", &[]));

        let mut handler = StaticFnHandler::new();
        handler.add_udt_uses(&a, f);
        handler.add_fn_uses_fn(f, g);
        handler.add_fn_uses_fn(g, f);
        handler.add_fn_uses_udt(g, &b);
        handler.write_out_to_db();

        assert_eq!(impl_names(&a), vec!["B"]);
    }

    #[test]
    fn missing_udt_facts_short_circuit_but_keep_call_edges() {
        let store = ObjectStore::new();
        let b = udt(&store, "B");
        let (caller, callee) = (function(&store, "caller"), function(&store, "callee"));
        let f = fn_id("", "f", &[]);

        let mut handler = StaticFnHandler::new();
        handler.add_fn_uses_udt(f, &b);
        handler.add_callgraph_dep(Some(&caller), Some(&callee));
        handler.add_callgraph_dep(Some(&caller), Some(&caller));
        handler.add_callgraph_dep(None, Some(&callee));
        assert_eq!(handler.write_out_to_db(), 0);

        assert_eq!(caller.read().callees().len(), 1);
        assert_eq!(callee.read().callers().len(), 1);
        assert!(b.read().reverse_uses_in_the_implementation().is_empty());
    }

    #[test]
    fn reset_forgets_everything() {
        let store = ObjectStore::new();
        let a = udt(&store, "A");
        let mut handler = StaticFnHandler::new();
        handler.add_udt_uses(&a, 1);
        handler.add_fn_uses_fn(1, 2);
        handler.reset();
        assert!(handler.is_empty());
    }
}
