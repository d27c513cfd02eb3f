//! Category — the two-level label a knowledge document files under.
//!
//! A category is a label, not an owned entity: directories are created
//! lazily on first use and re-derived idempotently. The primary level is a
//! closed set; the secondary level is an oracle-chosen label, sanitized to
//! a filesystem-safe component. Depth never exceeds two levels.

use serde::{Deserialize, Serialize};

/// The closed set of top-level knowledge categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryCategory {
    /// Technology and science
    Technical,
    /// Humanities and social sciences
    Humanities,
    /// Everyday life, health, education, economics
    Lifestyle,
    /// Everything that fits nowhere else
    Other,
}

impl PrimaryCategory {
    /// Directory name under the knowledge root.
    pub fn as_dir(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Humanities => "humanities",
            Self::Lifestyle => "lifestyle",
            Self::Other => "other",
        }
    }

    /// Parse an oracle-produced primary label. Accepts the canonical
    /// directory names plus the labels the classification prompt offers
    /// (including their Chinese forms, which some models echo back).
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        match label.to_lowercase().as_str() {
            "technical" | "technology" | "tech" | "science" => Some(Self::Technical),
            "humanities" | "social" => Some(Self::Humanities),
            "lifestyle" | "life" => Some(Self::Lifestyle),
            "other" | "misc" => Some(Self::Other),
            _ => match label {
                "技术科学类" | "技术科学" => Some(Self::Technical),
                "人文社科类" | "人文社科" => Some(Self::Humanities),
                "生活百科类" | "生活百科" => Some(Self::Lifestyle),
                "其他" => Some(Self::Other),
                _ => None,
            },
        }
    }
}

impl std::fmt::Display for PrimaryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_dir())
    }
}

/// A `(primary, secondary)` category pair. `secondary = None` means the
/// document files directly under the primary directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub primary: PrimaryCategory,
    pub secondary: Option<String>,
}

impl Category {
    pub fn new(primary: PrimaryCategory, secondary: Option<String>) -> Self {
        Self { primary, secondary }
    }

    /// The fallback category for empty, malformed, or failed classification.
    pub fn unclassified() -> Self {
        Self {
            primary: PrimaryCategory::Other,
            secondary: Some("unclassified".into()),
        }
    }

    /// Parse a raw `primary/secondary` oracle reply into a category.
    ///
    /// Fallback rules (all roads lead to `other/unclassified`):
    /// - empty reply, or no `/` separator;
    /// - unknown primary label;
    /// - secondary empty after sanitization.
    ///
    /// A secondary of `general` (or one identical to the primary label)
    /// is treated as "no secondary warranted" and maps to `None`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let Some((primary_raw, secondary_raw)) = raw.split_once('/') else {
            return Self::unclassified();
        };
        let Some(primary) = PrimaryCategory::parse(primary_raw) else {
            return Self::unclassified();
        };
        let secondary = sanitize_component(secondary_raw);
        if secondary.is_empty() {
            return Self::unclassified();
        }
        let lowered = secondary.to_lowercase();
        if lowered == "general" || lowered == primary.as_dir() {
            return Self {
                primary,
                secondary: None,
            };
        }
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Relative directory under the knowledge root: one or two levels,
    /// never more.
    pub fn rel_dir(&self) -> String {
        match &self.secondary {
            Some(secondary) => format!("{}/{}", self.primary.as_dir(), secondary),
            None => self.primary.as_dir().to_string(),
        }
    }

    /// Canonical `primary/secondary` label used for grouping and reports.
    pub fn label(&self) -> String {
        self.rel_dir()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.rel_dir())
    }
}

/// The outcome of a merge-cohesion judgment, constructed immediately after
/// parsing the oracle's text so downstream code never re-parses raw strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeDecision {
    pub merge: bool,
    pub reason: String,
}

impl MergeDecision {
    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            merge: false,
            reason: reason.into(),
        }
    }

    pub fn yes(reason: impl Into<String>) -> Self {
        Self {
            merge: true,
            reason: reason.into(),
        }
    }
}

/// Reduce a label to a filesystem-safe path component: alphanumeric
/// characters (including CJK), `-` and `_` pass through; everything else
/// becomes `_`; runs of `_` collapse; leading/trailing `_` are trimmed.
pub fn sanitize_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_underscore = false;
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() || ch == '-' {
            out.push(ch);
            last_was_underscore = false;
        } else if !last_was_underscore {
            out.push('_');
            last_was_underscore = true;
        }
    }
    out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_well_formed_pair() {
        let cat = Category::parse("technical/machine_learning");
        assert_eq!(cat.primary, PrimaryCategory::Technical);
        assert_eq!(cat.secondary.as_deref(), Some("machine_learning"));
        assert_eq!(cat.rel_dir(), "technical/machine_learning");
    }

    #[test]
    fn parse_accepts_prompt_language_labels() {
        let cat = Category::parse("技术科学类/深度学习");
        assert_eq!(cat.primary, PrimaryCategory::Technical);
        assert_eq!(cat.secondary.as_deref(), Some("深度学习"));
    }

    #[test]
    fn missing_separator_falls_back() {
        assert_eq!(Category::parse("technical"), Category::unclassified());
        assert_eq!(Category::parse(""), Category::unclassified());
    }

    #[test]
    fn unknown_primary_falls_back() {
        assert_eq!(Category::parse("cooking/stew"), Category::unclassified());
    }

    #[test]
    fn empty_secondary_falls_back() {
        assert_eq!(Category::parse("technical/!!!"), Category::unclassified());
    }

    #[test]
    fn general_secondary_collapses_to_one_level() {
        let cat = Category::parse("lifestyle/general");
        assert_eq!(cat.secondary, None);
        assert_eq!(cat.rel_dir(), "lifestyle");
    }

    #[test]
    fn secondary_matching_primary_collapses() {
        let cat = Category::parse("technical/Technical");
        assert_eq!(cat.secondary, None);
    }

    #[test]
    fn sanitize_strips_punctuation_and_collapses() {
        assert_eq!(sanitize_component("deep learning: part 1!"), "deep_learning_part_1");
        assert_eq!(sanitize_component("  __a__b__  "), "a_b");
        assert_eq!(sanitize_component("世界模型/应用"), "世界模型_应用");
    }

    #[test]
    fn sanitize_preserves_cjk() {
        assert_eq!(sanitize_component("深度学习"), "深度学习");
    }

    #[test]
    fn sanitize_all_junk_is_empty() {
        assert_eq!(sanitize_component("!!!///"), "");
    }
}
