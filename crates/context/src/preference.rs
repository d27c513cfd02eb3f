//! Best-effort preference and reflection records.
//!
//! Every processed turn leaves a structured trace of what the user seemed
//! to want, appended to CSV files for later inspection. Nothing here may
//! fail a turn: oracle errors fall back to a stub analysis, I/O errors are
//! logged and swallowed.

use chrono::Utc;
use loreweave_core::oracle::{GenerateOptions, Oracle};
use loreweave_oracle::{or_fallback, reply};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::prompts;

const PREFERENCE_FILE: &str = "user_preference.csv";
const REFLECTION_FILE: &str = "self_reflection.csv";

#[derive(Debug, Deserialize)]
struct IntentAnalysis {
    #[serde(default)]
    intent: String,
    #[serde(default)]
    requirements: String,
    #[serde(default)]
    insufficiency: String,
    #[serde(default)]
    summary: String,
}

impl IntentAnalysis {
    fn unparsed(user_text: &str) -> Self {
        Self {
            intent: "unknown".into(),
            requirements: user_text.to_string(),
            insufficiency: "analysis unavailable".into(),
            summary: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Reflection {
    #[serde(default)]
    improvement_strategy: String,
    #[serde(default)]
    summary: String,
}

/// Appends intent-analysis and self-reflection rows under a data directory.
pub struct PreferenceRecorder {
    oracle: Arc<dyn Oracle>,
    dir: PathBuf,
}

impl PreferenceRecorder {
    pub fn new(oracle: Arc<dyn Oracle>, dir: impl Into<PathBuf>) -> Self {
        Self {
            oracle,
            dir: dir.into(),
        }
    }

    /// Analyze what the user wanted and append a preference row.
    pub async fn record_intent(&self, session_id: &str, user_text: &str) {
        let analysis = or_fallback(
            "preference_analysis",
            async {
                let raw = self
                    .oracle
                    .generate(&prompts::intent_analysis(user_text), GenerateOptions::default())
                    .await?;
                reply::parse_json::<IntentAnalysis>(&raw)
            },
            IntentAnalysis::unparsed(user_text),
        )
        .await;

        let row = [
            Utc::now().to_rfc3339(),
            session_id.to_string(),
            analysis.intent,
            analysis.requirements,
            analysis.insufficiency,
            analysis.summary,
        ];
        self.append(
            PREFERENCE_FILE,
            &[
                "timestamp",
                "session_id",
                "intent",
                "requirements",
                "insufficiency",
                "summary",
            ],
            &row,
        );
    }

    /// Reflect on a finished exchange and append a reflection row.
    pub async fn record_reflection(&self, user_text: &str, assistant_text: &str) {
        let reflection = or_fallback(
            "self_reflection",
            async {
                let raw = self
                    .oracle
                    .generate(
                        &prompts::reflection(user_text, assistant_text),
                        GenerateOptions::default(),
                    )
                    .await?;
                reply::parse_json::<Reflection>(&raw)
            },
            Reflection {
                improvement_strategy: "reflection unavailable".into(),
                summary: String::new(),
            },
        )
        .await;

        let row = [
            Utc::now().to_rfc3339(),
            user_text.to_string(),
            assistant_text.to_string(),
            reflection.improvement_strategy,
            reflection.summary,
        ];
        self.append(
            REFLECTION_FILE,
            &[
                "timestamp",
                "user_text",
                "assistant_text",
                "improvement_strategy",
                "summary",
            ],
            &row,
        );
    }

    fn append(&self, file: &str, header: &[&str], row: &[String]) {
        if let Err(e) = self.append_inner(&self.dir.join(file), header, row) {
            warn!(file, error = %e, "Failed to append preference record");
        }
    }

    fn append_inner(
        &self,
        path: &Path,
        header: &[&str],
        row: &[String],
    ) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;
        let fresh = !path.exists();
        let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if fresh {
            writer.write_record(header)?;
        }
        writer.write_record(row)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use loreweave_core::error::OracleError;

    struct CannedOracle(&'static str);

    #[async_trait]
    impl Oracle for CannedOracle {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerateOptions,
        ) -> Result<String, OracleError> {
            Ok(self.0.to_string())
        }
    }

    struct DeadOracle;

    #[async_trait]
    impl Oracle for DeadOracle {
        async fn generate(
            &self,
            _prompt: &str,
            _options: GenerateOptions,
        ) -> Result<String, OracleError> {
            Err(OracleError::Exhausted)
        }
    }

    #[tokio::test]
    async fn writes_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Arc::new(CannedOracle(
            r#"{"intent":"learn","requirements":"rust","insufficiency":"","summary":"s"}"#,
        ));
        let recorder = PreferenceRecorder::new(oracle, dir.path());

        recorder.record_intent("s1", "teach me rust").await;
        recorder.record_intent("s1", "more rust").await;

        let content =
            std::fs::read_to_string(dir.path().join(PREFERENCE_FILE)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp,session_id"));
        assert!(lines[1].contains("learn"));
    }

    #[tokio::test]
    async fn oracle_failure_still_records_a_row() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = PreferenceRecorder::new(Arc::new(DeadOracle), dir.path());

        recorder.record_intent("s1", "whatever").await;

        let content =
            std::fs::read_to_string(dir.path().join(PREFERENCE_FILE)).unwrap();
        assert!(content.contains("unknown"));
        assert!(content.contains("whatever"));
    }

    #[tokio::test]
    async fn reflection_rows_land_in_their_own_file() {
        let dir = tempfile::tempdir().unwrap();
        let oracle = Arc::new(CannedOracle(
            r#"{"improvement_strategy":"cite sources","summary":"ok"}"#,
        ));
        let recorder = PreferenceRecorder::new(oracle, dir.path());

        recorder.record_reflection("q", "a").await;

        let content =
            std::fs::read_to_string(dir.path().join(REFLECTION_FILE)).unwrap();
        assert!(content.contains("cite sources"));
    }
}
