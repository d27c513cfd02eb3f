//! Filesystem backends for loreweave.
//!
//! [`FsStore`] implements the hierarchical document store the curator
//! works against; [`JsonlLog`] implements the append-only conversation
//! log the pipeline's history stage reads from.

mod fs;
mod log;

pub use fs::FsStore;
pub use log::JsonlLog;
