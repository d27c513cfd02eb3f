//! # loreweave Core
//!
//! Domain types, traits, and error definitions for the loreweave assistant.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod answer;
pub mod category;
pub mod clarify;
pub mod error;
pub mod log;
pub mod oracle;
pub mod report;
pub mod session;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use answer::AnswerEngine;
pub use category::{Category, MergeDecision, PrimaryCategory, sanitize_component};
pub use clarify::{CandidateIntent, ClarificationRequest, NeedMoreInfo};
pub use error::{Error, Result};
pub use log::{ConversationLog, LogEntry};
pub use oracle::{GenerateOptions, Oracle};
pub use report::{DeleteReason, Disposition, ReorganizationRecord, ReorganizationReport};
pub use session::{ContextMessage, Role, SessionId, Turn};
pub use store::DocumentStore;
