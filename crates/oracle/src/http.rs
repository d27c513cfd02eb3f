//! OpenAI-compatible HTTP transport.
//!
//! Speaks the `/chat/completions` wire shape, which covers DashScope's
//! compatible mode and most other hosted endpoints. Streaming is not
//! requested; the reply arrives as one complete string, which is all the
//! core contract needs.

use crate::client::Transport;
use async_trait::async_trait;
use loreweave_core::error::OracleError;
use loreweave_core::oracle::GenerateOptions;
use tracing::{debug, warn};

/// HTTP transport bound to one endpoint and model; the credential varies
/// per call, supplied by the rotating client.
pub struct HttpTransport {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        }
    }

    /// Build a transport from the oracle section of the app config.
    pub fn from_config(config: &loreweave_config::OracleConfig) -> Self {
        Self::new(&config.api_url, &config.model, config.timeout_secs)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        prompt: &str,
        credential: &str,
        options: &GenerateOptions,
    ) -> std::result::Result<String, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ],
            "stream": false,
        });
        if let Some(max_tokens) = options.max_output_hint {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(model = %self.model, "Sending generation request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {credential}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(OracleError::Quota { retry_after_secs: 5 });
        }
        if status == 401 || status == 403 {
            return Err(OracleError::Auth(
                "Invalid API key or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Oracle endpoint returned error");
            return Err(OracleError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            OracleError::MalformedReply(format!("failed to parse response body: {e}"))
        })?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| OracleError::MalformedReply("no message content in reply".into()))
    }
}
