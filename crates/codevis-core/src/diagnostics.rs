//! Explicitly passed diagnostics context.
//!
//! Built once by the caller and shared (`Arc<Diagnostics>`) with the executor,
//! the scanners and the resolver. Every message is mirrored into `tracing`
//! and, when set, forwarded to the message callback together with the id of
//! the thread that produced it.

use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives `(message, thread_id)`.
pub type MessageCallback = Box<dyn Fn(&str, u64) + Send + Sync>;

#[derive(Default)]
pub struct Diagnostics {
    callback: Option<MessageCallback>,
    debug_output: bool,
    warnings: AtomicUsize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(mut self, callback: impl Fn(&str, u64) + Send + Sync + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    pub fn with_debug_output(mut self, debug_output: bool) -> Self {
        self.debug_output = debug_output;
        self
    }

    pub fn debug_output(&self) -> bool {
        self.debug_output
    }

    /// Number of warnings reported so far.
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    pub fn message(&self, message: &str) {
        let thread_id = current_thread_id();
        tracing::info!(thread_id, "{message}");
        self.forward(message, thread_id);
    }

    pub fn warn(&self, message: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        let thread_id = current_thread_id();
        tracing::warn!(thread_id, "{message}");
        self.forward(message, thread_id);
    }

    /// Only formats and emits the message when debug output is enabled.
    pub fn debug(&self, message: impl FnOnce() -> String) {
        if !self.debug_output {
            return;
        }
        let message = message();
        let thread_id = current_thread_id();
        tracing::debug!(thread_id, "{message}");
        self.forward(&message, thread_id);
    }

    fn forward(&self, message: &str, thread_id: u64) {
        if let Some(callback) = &self.callback {
            callback(message, thread_id);
        }
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("has_callback", &self.callback.is_some())
            .field("debug_output", &self.debug_output)
            .field("warnings", &self.warning_count())
            .finish()
    }
}

/// Stable numeric id for the calling thread.
pub fn current_thread_id() -> u64 {
    let mut hasher = rustc_hash::FxHasher::default();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}
