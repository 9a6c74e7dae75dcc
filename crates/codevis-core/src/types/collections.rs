//! Fx hash collections used for the per-translation-unit lookup tables.

pub use rustc_hash::{FxHashMap, FxHashSet};
