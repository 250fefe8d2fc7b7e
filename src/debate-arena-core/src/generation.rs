//! Text generation boundary.
//!
//! The arena only needs `prompt -> text`. [`OpenAiGenerator`] provides that
//! over any OpenAI-compatible endpoint.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessage,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::ModelConfig;
use crate::error::GenerationError;

/// Something that turns a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Endpoint and credentials for an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub api_base: String,
    pub api_key: String,
}

impl ApiSettings {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }
}

/// Chat-completion backed generator.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: ModelConfig,
}

impl OpenAiGenerator {
    pub fn new(api: &ApiSettings, model: ModelConfig) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        let config = OpenAIConfig::new()
            .with_api_key(&api.api_key)
            .with_api_base(&api.api_base);

        Ok(Self {
            client: Client::with_config(config).with_http_client(http_client),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model.name
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    /// Ask the model once, retrying transient failures and empty replies with
    /// exponential backoff (1s, 2s, 4s, ...).
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model.name)
            .max_completion_tokens(self.model.max_tokens)
            .temperature(self.model.temperature)
            .messages(vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: prompt.to_string().into(),
                    name: None,
                },
            )])
            .build()?;

        let attempts = self.model.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(1 << (attempt - 1).min(5))).await;
            }

            match self.client.chat().create(request.clone()).await {
                Ok(response) => {
                    let content = response
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    if !content.trim().is_empty() {
                        debug!(model = %self.model.name, chars = content.len(), "generated text");
                        return Ok(content);
                    }
                    warn!(
                        model = %self.model.name,
                        attempt = attempt + 1,
                        attempts,
                        "empty response, retrying"
                    );
                }
                Err(e) if !is_transient(&e) => {
                    warn!(model = %self.model.name, error = %e, "completion request rejected");
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(
                        model = %self.model.name,
                        attempt = attempt + 1,
                        attempts,
                        error = %e,
                        "completion request failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => GenerationError::from(e),
            None => GenerationError::EmptyResponse {
                model: self.model.name.clone(),
                attempts,
            },
        })
    }
}

/// Whether a failed completion request is worth repeating.
///
/// Transport failures, server errors and rate limits are; rejected requests
/// (bad key, bad model, invalid arguments) are not. The client reports a 5xx
/// as an [`ApiError`](async_openai::error::ApiError) carrying only the raw
/// body, with no type or code.
fn is_transient(error: &OpenAIError) -> bool {
    match error {
        OpenAIError::Reqwest(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.is_request()
                || e.is_body()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        OpenAIError::ApiError(api) => {
            let kind = api.r#type.as_deref();
            let code = api.code.as_deref();
            (kind.is_none() && code.is_none())
                || kind == Some("server_error")
                || kind == Some("rate_limit_exceeded")
                || code == Some("rate_limit_exceeded")
        }
        _ => false,
    }
}

/// Strip reasoning tags, markup and emphasis from a model reply so only the
/// spoken argument remains.
pub fn sanitize_response(response: &str) -> String {
    let tags_to_strip = [
        "thinking",
        "think",
        "reflection",
        "reflect",
        "internal",
        "reasoning",
        "thought",
        "scratch",
        "scratchpad",
        "plan",
        "analysis",
    ];

    let mut result = response.to_string();

    for tag in &tags_to_strip {
        let pattern = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>");
        if let Ok(re) = regex::Regex::new(&pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }

    if let Ok(orphan_re) = regex::Regex::new(r"</?[\w]+[^>]*>") {
        result = orphan_re.replace_all(&result, "").to_string();
    }

    result = result.replace('*', "");

    // Keep paragraph breaks, collapse everything else.
    if let Ok(ws_re) = regex::Regex::new(r"[ \t]+") {
        result = ws_re.replace_all(&result, " ").to_string();
    }
    if let Ok(nl_re) = regex::Regex::new(r"\s*\n\s*\n\s*") {
        result = nl_re.replace_all(&result, "\n\n").to_string();
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(kind: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "request failed".to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_server_and_rate_limit_errors_are_retried() {
        assert!(is_transient(&api_error(None, None)));
        assert!(is_transient(&api_error(Some("server_error"), None)));
        assert!(is_transient(&api_error(Some("requests"), Some("rate_limit_exceeded"))));
    }

    #[test]
    fn test_rejected_requests_are_not_retried() {
        assert!(!is_transient(&api_error(
            Some("invalid_request_error"),
            Some("invalid_api_key")
        )));
        assert!(!is_transient(&api_error(
            Some("invalid_request_error"),
            Some("model_not_found")
        )));
        assert!(!is_transient(&api_error(Some("insufficient_quota"), None)));
        assert!(!is_transient(&OpenAIError::InvalidArgument(
            "temperature out of range".into()
        )));
    }

    #[test]
    fn test_sanitize_strips_thinking() {
        let input = "<thinking>Let me plan my rebuttal...</thinking>Remote work saves commuting time.";
        assert_eq!(sanitize_response(input), "Remote work saves commuting time.");
    }

    #[test]
    fn test_sanitize_multiline_reasoning() {
        let input = "<reasoning>\nfirst\nsecond\n</reasoning>\nMy closing argument.";
        assert_eq!(sanitize_response(input), "My closing argument.");
    }

    #[test]
    fn test_sanitize_removes_emphasis_and_orphans() {
        let input = "This is **crucial**</p> evidence.";
        assert_eq!(sanitize_response(input), "This is crucial evidence.");
    }

    #[test]
    fn test_sanitize_keeps_paragraphs() {
        let input = "First point.\n\n\n   Second   point.";
        assert_eq!(sanitize_response(input), "First point.\n\nSecond point.");
    }

    #[test]
    fn test_sanitize_plain_text_untouched() {
        assert_eq!(sanitize_response("No tags here."), "No tags here.");
    }
}
