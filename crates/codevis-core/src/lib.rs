//! Shared foundation for the codevis workspace: errors, layered configuration,
//! tracing setup, the diagnostics context and cancellation.

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod tracing;
pub mod traits;
pub mod types;

pub use diagnostics::Diagnostics;
pub use traits::{Cancellable, CancellationToken};
