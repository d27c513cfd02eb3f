//! The assembled loreweave assistant.
//!
//! [`Assistant`] wires the context pipeline, the answer engine, the
//! session buffers, the conversation log, and knowledge ingestion into
//! the three operations the application consumes: `process_turn`,
//! `ingest_turn`, and `reorganize`. No wire format or CLI surface lives
//! here; those belong to the surrounding application.

mod assistant;

pub use assistant::{Assistant, TurnReply};
