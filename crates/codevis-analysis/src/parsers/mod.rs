//! Tree-sitter C++ frontend. One parser per worker thread.

pub mod error_tolerant;
pub mod includes;

use std::cell::RefCell;
use std::path::Path;

use codevis_core::errors::ScanError;
use tree_sitter::{Node, Parser, Tree};

pub use error_tolerant::{collect_errors, SyntaxError};
pub use includes::{extract_includes, IncludeDirective};

thread_local! {
    static PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

fn new_parser(path: &Path) -> Result<Parser, ScanError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_cpp::LANGUAGE.into())
        .map_err(|e| ScanError::ParserError {
            path: path.to_path_buf(),
            message: format!("failed to set language: {e}"),
        })?;
    Ok(parser)
}

/// Parses `source` with this thread's parser.
pub fn parse_source(path: &Path, source: &[u8]) -> Result<Tree, ScanError> {
    PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(new_parser(path)?);
        }
        let parser = slot.as_mut().ok_or_else(|| ScanError::ParserError {
            path: path.to_path_buf(),
            message: "parser unavailable".to_string(),
        })?;
        parser.parse(source, None).ok_or_else(|| ScanError::ParserError {
            path: path.to_path_buf(),
            message: "parse returned no tree".to_string(),
        })
    })
}

/// Reads and parses the file at `path`.
pub fn parse_file(path: &Path) -> Result<(Vec<u8>, Tree), ScanError> {
    let source = std::fs::read(path).map_err(|source| ScanError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = parse_source(path, &source)?;
    Ok((source, tree))
}

/// Source text of `node`, empty when it is not valid UTF-8.
pub fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// One-based line of `node`.
pub fn node_line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

/// Named children of `node`, collected so the cursor borrow ends here.
pub fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}
