//! rig-core integration for the judgment step.
//!
//! Uses rig-core's provider clients and Agent abstraction for
//! multi-provider support: Anthropic, OpenAI, Cohere, Gemini,
//! Perplexity, DeepSeek, xAI, Groq, and any OpenAI-compatible API.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;
use crate::models::{AuditReport, ProviderName};

use super::{JudgeError, JudgeProvider};

/// Maximum tokens per completion response.
///
/// Set high enough to accommodate thinking models that consume part of
/// the budget for internal reasoning tokens.
const MAX_TOKENS: u64 = 65536;

/// Maximum length of response text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

/// Maximum number of retry attempts for transient API errors.
pub const MAX_RETRIES: u32 = 5;

/// Initial backoff delay between retries.
pub const INITIAL_BACKOFF: Duration = Duration::from_secs(10);

/// Maximum backoff delay between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Build an agent from a rig-core client and prompt it.
///
/// Always sets `max_tokens` — all rig-core providers support it and
/// without it some (e.g. Gemini) default to a low limit that truncates
/// responses.
macro_rules! prompt_judge {
    ($client:expr, $model:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature(0.0)
            .max_tokens(MAX_TOKENS)
            .output_schema::<AuditReport>()
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| JudgeError::ApiError(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key)
            .map_err(|e| JudgeError::ApiError(format!("failed to create {} client: {e}", $label)))
    }};
}

/// rig-core based judgment provider.
///
/// The provider name in config selects which rig-core client to use.
pub struct RigJudge {
    config: ProviderConfig,
}

impl RigJudge {
    /// Create a new RigJudge with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, JudgeError> {
        if config.api_key.is_none() {
            return Err(JudgeError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or the provider-specific env var.",
                config.name,
                crate::constants::ENV_API_KEY
            )));
        }
        Ok(Self { config })
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, JudgeError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| JudgeError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Require `base_url` for OpenAI-compatible providers.
    fn require_base_url(&self) -> Result<&str, JudgeError> {
        self.config.base_url.as_deref().ok_or_else(|| {
            JudgeError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            )
        })
    }

    /// Get the API key or return an error.
    fn api_key(&self) -> Result<&str, JudgeError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| JudgeError::NotConfigured("missing API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw
    /// response text.
    async fn call_rig(&self, system_prompt: &str, user_prompt: &str) -> Result<String, JudgeError> {
        let api_key = self.api_key()?;
        let model = self.config.model.as_str();

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        JudgeError::ApiError(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_judge!(client, model, system_prompt, user_prompt, "Anthropic")
            }
            ProviderName::OpenAI => {
                let client = self.build_openai_client(api_key)?;
                prompt_judge!(client, model, system_prompt, user_prompt, "OpenAI")
            }
            ProviderName::Cohere => {
                let client = new_client!(providers::cohere::Client, api_key, "Cohere")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "Cohere")
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, "Gemini")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "Gemini")
            }
            ProviderName::Perplexity => {
                let client = new_client!(providers::perplexity::Client, api_key, "Perplexity")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "Perplexity")
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, "DeepSeek")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "DeepSeek")
            }
            ProviderName::XAI => {
                let client = new_client!(providers::xai::Client, api_key, "xAI")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "xAI")
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, "Groq")?;
                prompt_judge!(client, model, system_prompt, user_prompt, "Groq")
            }
            ProviderName::OpenAICompatible => {
                let base_url = self.require_base_url()?;
                let client: providers::openai::CompletionsClient =
                    providers::openai::CompletionsClient::builder()
                        .api_key(api_key)
                        .base_url(base_url)
                        .build()
                        .map_err(|e| {
                            JudgeError::ApiError(format!(
                                "failed to create OpenAI-compatible client: {e}"
                            ))
                        })?;
                prompt_judge!(
                    client,
                    model,
                    system_prompt,
                    user_prompt,
                    "OpenAI-compatible"
                )
            }
        }
    }
}

#[async_trait]
impl JudgeProvider for RigJudge {
    async fn judge(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<AuditReport, JudgeError> {
        let response = self.call_rig(system_prompt, user_prompt).await?;
        parse_report_response(&response)
    }
}

/// Check whether a judge error is transient and worth retrying.
///
/// Parse errors are never retried — the model is likely to produce the
/// same malformed output again (especially truncated responses).
pub fn is_retryable(err: &JudgeError) -> bool {
    match err {
        JudgeError::ParseError(_) => false,
        _ => classify_error(err).is_some(),
    }
}

/// Classifies a judge error into a short, user-friendly message.
///
/// Returns `Some(message)` for transient/retryable errors, `None`
/// otherwise.
pub fn classify_error(err: &JudgeError) -> Option<&'static str> {
    match err {
        JudgeError::ApiError(msg) => {
            let msg_lower = msg.to_lowercase();
            if msg_lower.contains("429")
                || msg_lower.contains("rate limit")
                || msg_lower.contains("too many requests")
            {
                Some("Rate limited by API")
            } else if msg_lower.contains("503")
                || msg_lower.contains("service unavailable")
                || msg_lower.contains("high demand")
            {
                Some("High model load")
            } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
                Some("API overloaded")
            } else if msg_lower.contains("502") {
                Some("API gateway error")
            } else if msg_lower.contains("timeout") || msg_lower.contains("timed out") {
                Some("Request timed out")
            } else if msg_lower.contains("connection") {
                Some("Connection error")
            } else if msg_lower.contains("temporarily") || msg_lower.contains("try again") {
                Some("Temporary API error")
            } else {
                None
            }
        }
        JudgeError::ParseError(_) => Some("Failed to parse judgment response"),
        _ => None,
    }
}

/// Compute the backoff duration for a retry attempt using exponential
/// backoff.
pub fn retry_backoff(attempt: u32) -> Duration {
    let backoff = INITIAL_BACKOFF.saturating_mul(2u32.saturating_pow(attempt));
    backoff.min(MAX_BACKOFF)
}

/// Parse the response text into a structured report.
///
/// With `output_schema` enforcing the shape at the provider level the
/// response is expected to be valid JSON, but providers drift: some
/// wrap JSON in markdown fences, some prepend prose. Candidates are
/// tried in order; the report's lenient deserializers clamp the score
/// and default missing fields.
pub fn parse_report_response(response: &str) -> Result<AuditReport, JudgeError> {
    let trimmed = response.trim();

    for candidate in extract_json_candidates(trimmed) {
        if let Ok(mut report) = serde_json::from_str::<AuditReport>(&candidate) {
            report.clamp_score();
            return Ok(report);
        }
    }

    Err(JudgeError::ParseError(format!(
        "could not parse judgment response as a report. Response: {}",
        &response[..response.len().min(PARSE_ERROR_PREVIEW_LEN)]
    )))
}

/// Regex for extracting content inside markdown code fences.
///
/// The closing ``` must appear at the start of a line to avoid matching
/// triple-backticks embedded inside JSON string values (e.g.
/// remediation fields containing code examples).
static FENCE_RE: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").unwrap());

/// Extract candidate JSON strings from a response.
///
/// Returns the trimmed response itself, the outermost `{...}` slice,
/// and any content inside markdown code fences.
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    // First candidate: the raw text.
    candidates.push(text.to_string());

    // Second: brace extraction — find the first '{' and last '}'.
    // The most robust strategy when the response contains nested code
    // fences inside JSON string values.
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(text[start..=end].to_string());
        }
    }

    // Third: content from markdown code fences.
    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner_trimmed = inner.as_str().trim();
            if !inner_trimmed.is_empty() {
                candidates.push(inner_trimmed.to_string());
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_json_report() {
        let response = r#"{
            "score": 85,
            "summary": "Mostly compliant",
            "findings": [
                {"category": "Drift", "description": "Missing endpoint",
                 "evidence": "api.py:L10", "rationale": "Required", "remediation": "Add it"}
            ]
        }"#;
        let report = parse_report_response(response).unwrap();
        assert_eq!(report.score, 85.0);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].category, "Drift");
    }

    #[test]
    fn parse_markdown_fenced_report() {
        let response = "Here is the analysis:\n```json\n{\"score\": 70, \"summary\": \"ok\"}\n```\n";
        let report = parse_report_response(response).unwrap();
        assert_eq!(report.score, 70.0);
    }

    #[test]
    fn parse_json_embedded_in_prose() {
        let response = "I analyzed the repo.\n{\"score\": 60, \"summary\": \"drift found\"}\nDone.";
        let report = parse_report_response(response).unwrap();
        assert_eq!(report.score, 60.0);
    }

    #[test]
    fn parse_out_of_range_score_is_clamped() {
        let report = parse_report_response(r#"{"score": 300}"#).unwrap();
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn parse_prose_only_fails() {
        let result = parse_report_response("No JSON here at all.");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("could not parse"));
    }

    #[test]
    fn parse_empty_response_fails() {
        assert!(parse_report_response("").is_err());
        assert!(parse_report_response("   \n  ").is_err());
    }

    #[test]
    fn parse_evolution_shape_via_alias() {
        let response = r#"{"feature_loss_score": 55, "feature_changes": [
            {"feature_name": "export", "status": "Loss", "severity": "Critical"}
        ], "summary": "loss detected"}"#;
        let report = parse_report_response(response).unwrap();
        assert_eq!(report.score, 55.0);
        assert_eq!(report.feature_changes.len(), 1);
        assert!(report.feature_changes[0].is_loss());
    }

    #[test]
    fn extract_candidates_raw_first() {
        let text = r#"{"a":1}"#;
        let candidates = extract_json_candidates(text);
        assert_eq!(candidates[0], text);
    }

    #[test]
    fn extract_candidates_no_braces() {
        let candidates = extract_json_candidates("no json here");
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn extract_candidates_nested_fences() {
        // Remediation text containing its own fence must not break
        // brace extraction.
        let response = "```json\n{\n  \"score\": 40,\n  \"summary\": \"s\",\n  \"findings\": [{\"category\": \"c\", \"description\": \"d\", \"remediation\": \"Use:\\n```\\ncode\\n```\"}]\n}\n```";
        let candidates = extract_json_candidates(response);
        let parsed = candidates
            .iter()
            .any(|c| serde_json::from_str::<AuditReport>(c).is_ok());
        assert!(parsed, "should find a parseable candidate");
    }

    #[test]
    fn new_judge_missing_api_key() {
        let config = ProviderConfig {
            name: ProviderName::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            api_key: None,
        };
        match RigJudge::new(config) {
            Err(e) => assert!(e.to_string().contains("API key"), "got: {e}"),
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_judge_with_api_key() {
        let config = ProviderConfig {
            name: ProviderName::Anthropic,
            model: "claude-sonnet-4-20250514".to_string(),
            base_url: None,
            api_key: Some("sk-test-key".to_string()),
        };
        assert!(RigJudge::new(config).is_ok());
    }

    #[test]
    fn require_base_url_missing() {
        let config = ProviderConfig {
            name: ProviderName::OpenAICompatible,
            model: "custom-model".to_string(),
            base_url: None,
            api_key: Some("key".to_string()),
        };
        let judge = RigJudge::new(config).unwrap();
        let err = judge.require_base_url().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn retryable_429_rate_limit() {
        let err = JudgeError::ApiError("HTTP 429 Too Many Requests".into());
        assert!(is_retryable(&err));
    }

    #[test]
    fn retryable_overloaded_message() {
        let err = JudgeError::ApiError("Anthropic API error: overloaded, try later".into());
        assert!(is_retryable(&err));
    }

    #[test]
    fn not_retryable_auth_error() {
        let err = JudgeError::ApiError("Invalid API key: 401 Unauthorized".into());
        assert!(!is_retryable(&err));
    }

    #[test]
    fn not_retryable_parse_error() {
        let err = JudgeError::ParseError("bad json".into());
        assert!(!is_retryable(&err));
    }

    #[test]
    fn backoff_is_exponential_and_capped() {
        assert_eq!(retry_backoff(0), Duration::from_secs(10));
        assert_eq!(retry_backoff(1), Duration::from_secs(20));
        assert_eq!(retry_backoff(2), Duration::from_secs(40));
        assert_eq!(retry_backoff(10), MAX_BACKOFF);
    }

    #[test]
    fn classify_error_variants() {
        assert_eq!(
            classify_error(&JudgeError::ApiError("HTTP 502 Bad Gateway".into())),
            Some("API gateway error")
        );
        assert_eq!(
            classify_error(&JudgeError::ApiError("request timed out".into())),
            Some("Request timed out")
        );
        assert_eq!(
            classify_error(&JudgeError::ApiError("connection refused".into())),
            Some("Connection error")
        );
        assert_eq!(
            classify_error(&JudgeError::ApiError("some unknown error".into())),
            None
        );
    }
}
