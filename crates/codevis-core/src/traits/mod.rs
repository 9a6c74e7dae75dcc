//! Traits shared across crates.

pub mod cancellation;

pub use cancellation::{Cancellable, CancellationToken};
