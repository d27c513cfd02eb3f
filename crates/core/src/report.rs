//! Reorganization records and the per-run report.
//!
//! Every document a curation run touches produces exactly one terminal
//! record; documents the run leaves untouched produce none. The aggregate
//! report is returned to the caller and never silently dropped.

use serde::{Deserialize, Serialize};

/// Why a document was deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteReason {
    /// Another document in the same content-hash group was kept
    Duplicate,
    /// Below the size threshold or matching known placeholder text
    Invalid,
}

/// What happened to one path during a reorganization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Disposition {
    /// Relocated under its category, possibly renamed
    Moved { to: String, category: String },

    /// Consolidated into a merged document, source deleted
    Merged { into: String },

    /// Removed as duplicate or invalid
    Deleted { reason: DeleteReason },

    /// A new consolidated document written by the merge phase
    Created {
        sources: Vec<String>,
        category: String,
    },

    /// The operation on this path failed; the run continued
    Failed { error: String },
}

/// One terminal record for one affected path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorganizationRecord {
    /// Path relative to the knowledge root
    pub path: String,

    pub disposition: Disposition,
}

/// The aggregate outcome of one curation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReorganizationReport {
    /// Documents inventoried at the start of the run
    pub analyzed: usize,

    pub duplicates_removed: usize,

    pub invalid_removed: usize,

    /// Source documents consumed by merges
    pub merged: usize,

    /// Documents moved under a new category path
    pub relocated: usize,

    /// Per-path failures the run isolated and skipped
    pub failed: usize,

    /// One record per affected path
    pub records: Vec<ReorganizationRecord>,
}

impl ReorganizationReport {
    /// True when the run changed nothing — the signal that a repeated run
    /// found the store already organized.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&mut self, path: impl Into<String>, disposition: Disposition) {
        match &disposition {
            Disposition::Moved { .. } => self.relocated += 1,
            Disposition::Merged { .. } => self.merged += 1,
            Disposition::Deleted {
                reason: DeleteReason::Duplicate,
            } => self.duplicates_removed += 1,
            Disposition::Deleted {
                reason: DeleteReason::Invalid,
            } => self.invalid_removed += 1,
            Disposition::Created { .. } => {}
            Disposition::Failed { .. } => self.failed += 1,
        }
        self.records.push(ReorganizationRecord {
            path: path.into(),
            disposition,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_counters() {
        let mut report = ReorganizationReport::default();
        report.record(
            "a.txt",
            Disposition::Deleted {
                reason: DeleteReason::Duplicate,
            },
        );
        report.record(
            "b.txt",
            Disposition::Deleted {
                reason: DeleteReason::Invalid,
            },
        );
        report.record(
            "c.txt",
            Disposition::Moved {
                to: "technical/ml/c.txt".into(),
                category: "technical/ml".into(),
            },
        );
        report.record("d.txt", Disposition::Merged { into: "m.txt".into() });
        report.record(
            "e.txt",
            Disposition::Failed {
                error: "permission denied".into(),
            },
        );

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.invalid_removed, 1);
        assert_eq!(report.relocated, 1);
        assert_eq!(report.merged, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.records.len(), 5);
        assert!(!report.is_empty());
    }

    #[test]
    fn created_does_not_count_as_relocation() {
        let mut report = ReorganizationReport::default();
        report.record(
            "technical/ml/merged.txt",
            Disposition::Created {
                sources: vec!["a.txt".into(), "b.txt".into()],
                category: "technical/ml".into(),
            },
        );
        assert_eq!(report.relocated, 0);
        assert_eq!(report.records.len(), 1);
    }

    #[test]
    fn empty_report_signals_idempotent_rerun() {
        assert!(ReorganizationReport::default().is_empty());
    }

    #[test]
    fn disposition_serializes_with_action_tag() {
        let json = serde_json::to_string(&Disposition::Deleted {
            reason: DeleteReason::Invalid,
        })
        .unwrap();
        assert!(json.contains("\"action\":\"deleted\""));
        assert!(json.contains("\"invalid\""));
    }
}
