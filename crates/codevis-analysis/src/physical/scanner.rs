//! Physical pass frontend action.

use codevis_core::errors::ScanError;
use codevis_core::tracing::metrics;
use codevis_core::Diagnostics;
use codevis_model::ObjectStore;
use tracing::debug;

use super::header_callbacks::HeaderCallbacks;
use super::include_walker::IncludeWalker;
use crate::compile_db::CompileCommand;
use crate::constants::ToolConstants;
use crate::executor::FrontendAction;

/// Walks the include graph of each translation unit. Function bodies are
/// never looked at, so code that does not compile still yields its includes.
pub struct PhysicalScanner<'a> {
    store: &'a ObjectStore,
    constants: &'a ToolConstants,
    diagnostics: &'a Diagnostics,
}

impl<'a> PhysicalScanner<'a> {
    pub fn new(store: &'a ObjectStore, constants: &'a ToolConstants, diagnostics: &'a Diagnostics) -> Self {
        Self {
            store,
            constants,
            diagnostics,
        }
    }
}

impl FrontendAction for PhysicalScanner<'_> {
    fn run(&self, command: &CompileCommand) -> Result<(), ScanError> {
        let mut walker = IncludeWalker::new(command.include_search(&self.constants.include_paths));
        let mut callbacks = HeaderCallbacks::new(self.store, self.constants, self.diagnostics);
        walker.walk(&command.file, &mut callbacks)?;
        debug!(
            file = %command.file.display(),
            files = walker.visited(),
            { metrics::INCLUDE_EDGES } = callbacks.include_edges(),
            "physical scan done"
        );
        Ok(())
    }
}
