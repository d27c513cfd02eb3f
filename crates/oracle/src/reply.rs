//! Parsing helpers for structured oracle replies.
//!
//! Replies are plain text; these helpers turn them into typed values and
//! fail with `MalformedReply` so call sites can apply their documented
//! fallback through [`or_fallback`](crate::or_fallback). Models often wrap
//! JSON in markdown fences; those are stripped before parsing.

use loreweave_core::error::OracleError;
use serde::de::DeserializeOwned;

/// Parse a JSON reply, tolerating surrounding prose and ``` fences.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, OracleError> {
    let trimmed = strip_fences(raw);
    serde_json::from_str(trimmed).or_else(|_| {
        // Fall back to the outermost braces in case the model added prose.
        let start = trimmed.find('{');
        let end = trimmed.rfind('}');
        match (start, end) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str(&trimmed[start..=end]).map_err(|e| {
                    OracleError::MalformedReply(format!("JSON reply did not parse: {e}"))
                })
            }
            _ => Err(OracleError::MalformedReply(
                "reply contains no JSON object".into(),
            )),
        }
    })
}

/// Parse a binary decision where the prompt demanded one of two keywords.
pub fn parse_keyword(raw: &str, truthy: &str, falsy: &str) -> Result<bool, OracleError> {
    let normalized = raw.trim().trim_matches(['"', '\'', '.', '。']).to_lowercase();
    if normalized == truthy {
        Ok(true)
    } else if normalized == falsy {
        Ok(false)
    } else {
        Err(OracleError::MalformedReply(format!(
            "expected '{truthy}' or '{falsy}', got '{}'",
            raw.trim()
        )))
    }
}

/// Parse a yes/no decision.
pub fn parse_yes_no(raw: &str) -> Result<bool, OracleError> {
    parse_keyword(raw, "yes", "no")
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        answer: String,
    }

    #[test]
    fn parses_bare_json() {
        let sample: Sample = parse_json(r#"{"answer": "ok"}"#).unwrap();
        assert_eq!(sample.answer, "ok");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"answer\": \"ok\"}\n```";
        let sample: Sample = parse_json(raw).unwrap();
        assert_eq!(sample.answer, "ok");
    }

    #[test]
    fn parses_json_with_surrounding_prose() {
        let raw = "Here you go: {\"answer\": \"ok\"} hope that helps";
        let sample: Sample = parse_json(raw).unwrap();
        assert_eq!(sample.answer, "ok");
    }

    #[test]
    fn rejects_non_json() {
        let result: Result<Sample, _> = parse_json("no structure here");
        assert!(matches!(result, Err(OracleError::MalformedReply(_))));
    }

    #[test]
    fn yes_no_is_case_insensitive() {
        assert!(parse_yes_no(" Yes ").unwrap());
        assert!(!parse_yes_no("NO.").unwrap());
        assert!(parse_yes_no("maybe").is_err());
    }

    #[test]
    fn keyword_pairs_work() {
        assert!(parse_keyword("clear", "clear", "unclear").unwrap());
        assert!(!parse_keyword("\"unclear\"", "clear", "unclear").unwrap());
    }
}
