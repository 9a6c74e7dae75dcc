//! Logical pass frontend action.

use codevis_core::errors::ScanError;
use codevis_core::Diagnostics;
use codevis_model::ObjectStore;
use tracing::debug;

use super::visitor::LogicalVisitor;
use crate::compile_db::CompileCommand;
use crate::constants::ToolConstants;
use crate::executor::FrontendAction;
use crate::physical::IncludeWalker;

/// Extracts namespaces, types, functions and their dependencies from each
/// translation unit. Expects the physical pass to have registered files.
pub struct LogicalScanner<'a> {
    store: &'a ObjectStore,
    constants: &'a ToolConstants,
    diagnostics: &'a Diagnostics,
}

impl<'a> LogicalScanner<'a> {
    pub fn new(store: &'a ObjectStore, constants: &'a ToolConstants, diagnostics: &'a Diagnostics) -> Self {
        Self {
            store,
            constants,
            diagnostics,
        }
    }
}

impl FrontendAction for LogicalScanner<'_> {
    fn run(&self, command: &CompileCommand) -> Result<(), ScanError> {
        let mut walker = IncludeWalker::new(command.include_search(&self.constants.include_paths));
        let mut visitor = LogicalVisitor::new(self.store, self.constants, self.diagnostics);
        walker.walk(&command.file, &mut visitor)?;
        let flattened = visitor.finish();
        let stats = visitor.stats();
        debug!(
            file = %command.file.display(),
            files = stats.files,
            types = stats.types,
            methods = stats.methods,
            fields = stats.fields,
            functions = stats.functions,
            variables = stats.variables,
            syntax_errors = stats.syntax_errors,
            flattened,
            "logical scan done"
        );
        Ok(())
    }
}
