//! Tree-sitter helpers for C++ declarations: names, signatures and the type
//! names referenced inside a subtree.

use tree_sitter::Node;

use crate::parsers::{named_children, node_text};

/// True when `child` is the `field` child of `parent`.
pub fn is_field(parent: Node<'_>, field: &str, child: Node<'_>) -> bool {
    parent
        .child_by_field_name(field)
        .is_some_and(|n| n.id() == child.id())
}

/// Drops a trailing `<...>` argument list.
pub fn strip_template_args(name: &str) -> &str {
    match name.find('<') {
        Some(idx) => name[..idx].trim_end(),
        None => name,
    }
}

/// Collapses runs of whitespace to one space.
pub fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The name `node` spells, including the qualifiers of every enclosing
/// `qualified_identifier` it is the name of. A scope segment (`B` in `B::f`)
/// yields the scope it names.
pub fn scoped_name(node: Node<'_>, source: &[u8]) -> String {
    let mut name = strip_template_args(node_text(node, source)).to_string();
    let mut current = node;
    if let Some(parent) = current.parent() {
        if parent.kind() == "qualified_identifier" && is_field(parent, "scope", current) {
            current = parent;
        }
    }
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "template_type" | "template_function" if is_field(parent, "name", current) => current = parent,
            "qualified_identifier" if is_field(parent, "name", current) => {
                if let Some(scope) = parent.child_by_field_name("scope") {
                    name = format!("{}::{name}", strip_template_args(node_text(scope, source)));
                }
                current = parent;
            }
            _ => break,
        }
    }
    name
}

/// Every type-like name referenced below `node`, in source order. Function
/// bodies are included, nested class bodies are not.
pub fn referenced_type_names(node: Node<'_>, source: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    collect_type_names(node, source, &mut names);
    names
}

fn collect_type_names(node: Node<'_>, source: &[u8], names: &mut Vec<String>) {
    match node.kind() {
        "type_identifier" | "namespace_identifier" => {
            names.push(scoped_name(node, source));
            return;
        }
        "field_declaration_list" => return,
        _ => {}
    }
    for child in named_children(node) {
        collect_type_names(child, source, names);
    }
}

/// A call to a named function inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub name: String,
    pub arguments: usize,
}

/// Calls through plain or qualified names below `node`. Member calls
/// (`a.f()`, `p->f()`) are skipped.
pub fn call_sites(node: Node<'_>, source: &[u8]) -> Vec<CallSite> {
    let mut calls = Vec::new();
    collect_calls(node, source, &mut calls);
    calls
}

fn collect_calls(node: Node<'_>, source: &[u8], calls: &mut Vec<CallSite>) {
    if node.kind() == "call_expression" {
        if let Some(function) = node.child_by_field_name("function") {
            if let Some(leaf) = callee_leaf(function) {
                let arguments = node
                    .child_by_field_name("arguments")
                    .map_or(0, |args| args.named_child_count());
                calls.push(CallSite {
                    name: scoped_name(leaf, source),
                    arguments,
                });
            }
        }
    }
    for child in named_children(node) {
        collect_calls(child, source, calls);
    }
}

/// Innermost identifier of a callee expression.
fn callee_leaf(function: Node<'_>) -> Option<Node<'_>> {
    match function.kind() {
        "identifier" => Some(function),
        "qualified_identifier" | "template_function" => function
            .child_by_field_name("name")
            .and_then(callee_leaf),
        _ => None,
    }
}

/// The `function_declarator` inside a declarator, looking through pointer
/// and reference wrappers. Also returns the return type decorations.
pub fn function_declarator(declarator: Node<'_>) -> Option<(Node<'_>, String)> {
    let mut current = declarator;
    let mut decorations = String::new();
    loop {
        match current.kind() {
            "function_declarator" => return Some((current, decorations)),
            "pointer_declarator" => decorations.push('*'),
            "reference_declarator" => decorations.push('&'),
            "parenthesized_declarator" => {}
            _ => return None,
        }
        current = current
            .child_by_field_name("declarator")
            .or_else(|| named_children(current).into_iter().last())?;
    }
}

/// Identifier at the core of a declarator (`x` in `*x[3] = 0`).
pub fn declarator_name<'t>(declarator: Node<'t>) -> Option<Node<'t>> {
    match declarator.kind() {
        "identifier" | "field_identifier" | "type_identifier" | "qualified_identifier" | "destructor_name"
        | "operator_name" | "template_function" => Some(declarator),
        _ => {
            let inner = declarator
                .child_by_field_name("declarator")
                .or_else(|| named_children(declarator).into_iter().find(|c| c.kind() != "type_qualifier"))?;
            declarator_name(inner)
        }
    }
}

/// `*`, `&` and `[]` contributed by a parameter or field declarator.
fn declarator_decorations(declarator: Option<Node<'_>>, source: &[u8]) -> String {
    let mut out = String::new();
    let mut current = declarator;
    while let Some(node) = current {
        match node.kind() {
            "pointer_declarator" | "abstract_pointer_declarator" => out.push('*'),
            "reference_declarator" | "abstract_reference_declarator" => {
                let text = node_text(node, source);
                out.push_str(if text.starts_with("&&") { "&&" } else { "&" });
            }
            "array_declarator" | "abstract_array_declarator" => out.push_str("[]"),
            _ => {}
        }
        current = node
            .child_by_field_name("declarator")
            .or_else(|| named_children(node).into_iter().find(|c| c.kind().ends_with("declarator")));
    }
    out
}

/// Type of a parameter as written, without the parameter name.
pub fn parameter_type(parameter: Node<'_>, source: &[u8]) -> String {
    let qualifiers: Vec<&str> = named_children(parameter)
        .into_iter()
        .filter(|c| c.kind() == "type_qualifier")
        .map(|c| node_text(c, source))
        .collect();
    let base = parameter
        .child_by_field_name("type")
        .map(|t| squash(node_text(t, source)))
        .unwrap_or_default();
    let decorations = declarator_decorations(parameter.child_by_field_name("declarator"), source);
    let mut out = qualifiers.join(" ");
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&base);
    out.push_str(&decorations);
    out
}

/// Parameter types of a `function_declarator`; `...` for variadics.
pub fn parameter_types(function_declarator: Node<'_>, source: &[u8]) -> Vec<String> {
    let Some(parameters) = function_declarator.child_by_field_name("parameters") else {
        return Vec::new();
    };
    // A C-style `...` is an anonymous token, so unnamed children count too.
    let mut cursor = parameters.walk();
    let types = parameters
        .children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "parameter_declaration" | "optional_parameter_declaration" => Some(parameter_type(p, source)),
            "variadic_parameter_declaration" | "..." => Some("...".to_string()),
            _ => None,
        })
        .filter(|t| t != "void")
        .collect();
    types
}

/// True when the declarator carries a trailing `const`.
pub fn is_const_function(function_declarator: Node<'_>, source: &[u8]) -> bool {
    named_children(function_declarator)
        .into_iter()
        .any(|c| c.kind() == "type_qualifier" && node_text(c, source) == "const")
}

/// True when any direct child is `kind` with text `text`.
pub fn has_child(node: Node<'_>, source: &[u8], kind: &str, text: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == kind && node_text(c, source) == text);
    found
}

/// `virtual` may appear as a keyword or a specifier node depending on
/// grammar version; `override` and `final` imply it.
pub fn is_virtual(declaration: Node<'_>, declarator: Node<'_>) -> bool {
    let mut cursor = declaration.walk();
    let keyword = declaration
        .children(&mut cursor)
        .any(|c| matches!(c.kind(), "virtual" | "virtual_function_specifier"));
    keyword
        || named_children(declarator)
            .into_iter()
            .any(|c| c.kind() == "virtual_specifier")
}

pub fn is_pure_virtual(declaration: Node<'_>, source: &[u8]) -> bool {
    let text = node_text(declaration, source).trim_end().trim_end_matches(';').trim_end();
    text.ends_with("= 0") || text.ends_with("=0")
}

pub fn is_static(declaration: Node<'_>, source: &[u8]) -> bool {
    has_child(declaration, source, "storage_class_specifier", "static")
}
