//! Error-tolerant parsing: locate ERROR and MISSING nodes so extraction can
//! carry on around them.

use tree_sitter::Node;

/// Position of one syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub missing: bool,
}

impl SyntaxError {
    pub fn message(&self) -> String {
        if self.missing {
            format!("missing token at line {}, column {}", self.line, self.column)
        } else {
            format!("syntax error at line {}, column {}", self.line, self.column)
        }
    }
}

/// Outermost ERROR and MISSING nodes, in source order.
pub fn collect_errors(root: Node<'_>) -> Vec<SyntaxError> {
    let mut errors = Vec::new();
    if root.has_error() {
        collect(root, &mut errors);
    }
    errors
}

fn collect(node: Node<'_>, errors: &mut Vec<SyntaxError>) {
    if node.is_error() || node.is_missing() {
        let pos = node.start_position();
        errors.push(SyntaxError {
            line: pos.row + 1,
            column: pos.column + 1,
            missing: node.is_missing(),
        });
        return;
    }
    if !node.has_error() {
        return;
    }
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect(child, errors);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::parsers::parse_source;

    #[test]
    fn clean_source_has_no_errors() {
        let tree = parse_source(Path::new("a.cpp"), b"namespace a { class B {}; }").unwrap();
        assert!(collect_errors(tree.root_node()).is_empty());
    }

    #[test]
    fn broken_source_reports_a_position() {
        let tree = parse_source(Path::new("a.cpp"), b"class A {\n  int x = ;\n};\n").unwrap();
        let errors = collect_errors(tree.root_node());
        assert!(!errors.is_empty());
        assert!(errors[0].line >= 1);
    }
}
