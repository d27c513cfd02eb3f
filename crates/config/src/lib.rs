//! Configuration loading, validation, and management for loreweave.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. Validates all settings at startup.

use loreweave_core::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Oracle endpoint and credential pool
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Conversation buffer and pipeline budgets
    #[serde(default)]
    pub context: ContextConfig,

    /// Curation thresholds and heuristics
    #[serde(default)]
    pub curation: CurationConfig,

    /// Filesystem layout
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Redact secrets in Debug output.
fn redact(keys: &[String]) -> String {
    format!("[{} key(s) redacted]", keys.len())
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("oracle", &self.oracle)
            .field("context", &self.context)
            .field("curation", &self.curation)
            .field("storage", &self.storage)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Ordered credential pool; rotation advances through this list
    #[serde(default)]
    pub api_keys: Vec<String>,

    /// Per-request timeout enforced by the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".into()
}
fn default_model() -> String {
    "qwen-plus".into()
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_model(),
            api_keys: Vec::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_keys", &redact(&self.api_keys))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Character budget of the live per-session buffer
    #[serde(default = "default_buffer_budget")]
    pub buffer_budget_chars: usize,

    /// Most recent persisted turns fetched by the history-load stage
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Turns returned by the relevant-context extract
    #[serde(default = "default_relevant_turns")]
    pub relevant_turns: usize,

    /// Character budget applied when the caller supplies none
    #[serde(default = "default_context_budget")]
    pub default_context_budget: usize,
}

fn default_buffer_budget() -> usize {
    30_000
}
fn default_history_limit() -> usize {
    10
}
fn default_relevant_turns() -> usize {
    3
}
fn default_context_budget() -> usize {
    10_000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            buffer_budget_chars: default_buffer_budget(),
            history_limit: default_history_limit(),
            relevant_turns: default_relevant_turns(),
            default_context_budget: default_context_budget(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurationConfig {
    /// Documents shorter than this are invalid
    #[serde(default = "default_min_valid_chars")]
    pub min_valid_chars: usize,

    /// Content prefix hashed for duplicate detection
    #[serde(default = "default_hash_prefix_chars")]
    pub hash_prefix_chars: usize,

    /// Content sample fed to classification
    #[serde(default = "default_classify_sample_chars")]
    pub classify_sample_chars: usize,

    /// Per-document sample in the direct merge judgment
    #[serde(default = "default_merge_sample_chars")]
    pub merge_sample_chars: usize,

    /// Per-document sample in the topic-tag pass
    #[serde(default = "default_tag_sample_chars")]
    pub tag_sample_chars: usize,

    /// Group size at or below which one direct yes/no judgment is used;
    /// larger groups go through tag clustering
    #[serde(default = "default_direct_judgment_max")]
    pub direct_judgment_max: usize,

    /// Documents sampled for topic tags in large groups
    #[serde(default = "default_tag_sample_cap")]
    pub tag_sample_cap: usize,

    /// Fraction of tags that must match the first document's tag for a
    /// large group to merge
    #[serde(default = "default_tag_overlap_threshold")]
    pub tag_overlap_threshold: f32,

    /// Length cap for generated filenames (before the extension)
    #[serde(default = "default_filename_max_chars")]
    pub filename_max_chars: usize,

    /// Content markers identifying placeholder documents
    #[serde(default = "default_placeholder_markers")]
    pub placeholder_markers: Vec<String>,
}

fn default_min_valid_chars() -> usize {
    50
}
fn default_hash_prefix_chars() -> usize {
    1000
}
fn default_classify_sample_chars() -> usize {
    2000
}
fn default_merge_sample_chars() -> usize {
    800
}
fn default_tag_sample_chars() -> usize {
    500
}
fn default_direct_judgment_max() -> usize {
    3
}
fn default_tag_sample_cap() -> usize {
    5
}
fn default_tag_overlap_threshold() -> f32 {
    0.6
}
fn default_filename_max_chars() -> usize {
    20
}
fn default_placeholder_markers() -> Vec<String> {
    vec!["默认的文档内容".into(), "示例文档".into()]
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            min_valid_chars: default_min_valid_chars(),
            hash_prefix_chars: default_hash_prefix_chars(),
            classify_sample_chars: default_classify_sample_chars(),
            merge_sample_chars: default_merge_sample_chars(),
            tag_sample_chars: default_tag_sample_chars(),
            direct_judgment_max: default_direct_judgment_max(),
            tag_sample_cap: default_tag_sample_cap(),
            tag_overlap_threshold: default_tag_overlap_threshold(),
            filename_max_chars: default_filename_max_chars(),
            placeholder_markers: default_placeholder_markers(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the knowledge document tree
    #[serde(default = "default_knowledge_root")]
    pub knowledge_root: PathBuf,

    /// Conversation log directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Preference / reflection CSV directory
    #[serde(default = "default_user_data_dir")]
    pub user_data_dir: PathBuf,
}

fn default_knowledge_root() -> PathBuf {
    PathBuf::from("data/knowledge")
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("data/log")
}
fn default_user_data_dir() -> PathBuf {
    PathBuf::from("data/user_data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            knowledge_root: default_knowledge_root(),
            log_dir: default_log_dir(),
            user_data_dir: default_user_data_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate. A missing file yields defaults (plus overrides).
    pub fn load(path: &Path) -> Result<Self, Error> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).map_err(|e| Error::Config {
                message: format!("failed to parse {}: {e}", path.display()),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(Error::Config {
                    message: format!("failed to read {}: {e}", path.display()),
                });
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment overrides, applied after file values:
    /// `LOREWEAVE_API_KEYS` (comma-separated), `LOREWEAVE_API_URL`,
    /// `LOREWEAVE_MODEL`, `LOREWEAVE_KNOWLEDGE_ROOT`.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(keys) = std::env::var("LOREWEAVE_API_KEYS") {
            let keys: Vec<String> = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
            if !keys.is_empty() {
                self.oracle.api_keys = keys;
            }
        }
        if let Ok(url) = std::env::var("LOREWEAVE_API_URL") {
            self.oracle.api_url = url;
        }
        if let Ok(model) = std::env::var("LOREWEAVE_MODEL") {
            self.oracle.model = model;
        }
        if let Ok(root) = std::env::var("LOREWEAVE_KNOWLEDGE_ROOT") {
            self.storage.knowledge_root = PathBuf::from(root);
        }
    }

    /// Reject configurations the subsystems cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.oracle.api_keys.is_empty() {
            return Err(Error::Config {
                message: "oracle.api_keys must hold at least one credential".into(),
            });
        }
        if self.context.buffer_budget_chars == 0 {
            return Err(Error::Config {
                message: "context.buffer_budget_chars must be positive".into(),
            });
        }
        let threshold = self.curation.tag_overlap_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::Config {
                message: format!("curation.tag_overlap_threshold {threshold} must be in 0..=1"),
            });
        }
        if self.curation.direct_judgment_max < 2 {
            return Err(Error::Config {
                message: "curation.direct_judgment_max must be at least 2".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_keys() -> AppConfig {
        let mut config = AppConfig::default();
        config.oracle.api_keys = vec!["key-a".into(), "key-b".into()];
        config
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.context.buffer_budget_chars, 30_000);
        assert_eq!(config.curation.min_valid_chars, 50);
        assert_eq!(config.curation.direct_judgment_max, 3);
        assert!((config.curation.tag_overlap_threshold - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.storage.knowledge_root, PathBuf::from("data/knowledge"));
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let config: AppConfig = toml::from_str(
            r#"
            [curation]
            min_valid_chars = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.curation.min_valid_chars, 10);
        assert_eq!(config.curation.hash_prefix_chars, 1000);
    }

    #[test]
    fn validate_rejects_empty_credential_pool() {
        let config = AppConfig::default();
        assert!(config.validate().is_err());
        assert!(with_keys().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        let mut config = with_keys();
        config.curation.tag_overlap_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        // Validation fails only because no credentials are configured.
        let err = AppConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("api_keys"));
    }

    #[test]
    fn load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
            [oracle]
            api_keys = ["k1"]
            model = "qwen-max"
            "#
        )
        .unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.oracle.model, "qwen-max");
        assert_eq!(config.oracle.api_keys.len(), 1);
    }

    #[test]
    fn debug_redacts_credentials() {
        let debug = format!("{:?}", with_keys());
        assert!(!debug.contains("key-a"));
        assert!(debug.contains("redacted"));
    }
}
