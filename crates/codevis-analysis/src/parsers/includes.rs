//! `#include` directives, including those nested in conditional blocks.

use tree_sitter::Node;

use super::{node_line, node_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// The spelled path without quotes or angle brackets.
    pub path: String,
    /// `<...>` rather than `"..."`.
    pub angled: bool,
    pub line: usize,
}

pub fn extract_includes(root: Node<'_>, source: &[u8]) -> Vec<IncludeDirective> {
    let mut out = Vec::new();
    visit(root, source, &mut out);
    out
}

fn visit(node: Node<'_>, source: &[u8], out: &mut Vec<IncludeDirective>) {
    if node.kind() == "preproc_include" {
        if let Some(path) = node.child_by_field_name("path") {
            let text = node_text(path, source).trim();
            let directive = match path.kind() {
                "system_lib_string" => Some((text.trim_start_matches('<').trim_end_matches('>'), true)),
                "string_literal" => Some((text.trim_matches('"'), false)),
                // Macro includes cannot be resolved without a preprocessor.
                _ => None,
            };
            if let Some((spelled, angled)) = directive {
                if !spelled.is_empty() {
                    out.push(IncludeDirective {
                        path: spelled.to_string(),
                        angled,
                        line: node_line(node),
                    });
                }
            }
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        visit(child, source, out);
    }
}
