//! Structured field names shared by spans across the workspace.

/// Executor: translation units scheduled in one run.
pub const TRANSLATION_UNITS: &str = "translation_units";

/// Executor: worker threads in the pool.
pub const THREAD_COUNT: &str = "thread_count";

/// Physical scanner: include edges recorded for one translation unit.
pub const INCLUDE_EDGES: &str = "include_edges";

/// Post-processing: types whose file ownership was rewritten.
pub const TYPES_RESOLVED: &str = "types_resolved";

/// Storage: wall time of a full store write in milliseconds.
pub const STORE_WRITE_TIME: &str = "store_write_time";

/// Merge: position of the source being merged.
pub const MERGE_INDEX: &str = "merge_index";
