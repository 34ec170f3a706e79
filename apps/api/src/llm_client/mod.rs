/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// All LLM interactions go through a `ModelProvider`.
///
/// One evaluation is exactly one generate-content request: no retries, no
/// backoff, no streaming. Model discovery is best-effort and never blocks.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[cfg(test)]
pub mod fake;

/// Fast-tier model used when discovery fails or finds no match.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
/// Substring identifying the fast model tier in listed model names.
pub const FAST_TIER_MARKER: &str = "flash";
const GENERATE_METHOD: &str = "generateContent";
/// Low temperature keeps strict scoring stable between runs.
const TEMPERATURE: f32 = 0.2;
const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),
}

/// One entry of the provider's model listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default, rename = "supportedGenerationMethods")]
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    fn supports_generation(&self) -> bool {
        self.supported_generation_methods
            .iter()
            .any(|m| m == GENERATE_METHOD)
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Picked from the provider's model listing.
    Discovered,
    /// Discovery failed or found nothing; the configured default was used.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedModel {
    pub name: String,
    pub source: ModelSource,
}

/// Provider seam. `GeminiClient` talks HTTP; tests substitute a fake.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn list_models(&self, api_key: &str) -> Result<Vec<ModelInfo>, LlmError>;

    /// Returns the first candidate's first text part.
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, LlmError>;
}

/// Picks a generation-capable fast-tier model from the listing, falling back
/// to `default_model` on any discovery failure.
pub async fn resolve_model(
    provider: &dyn ModelProvider,
    api_key: &str,
    default_model: &str,
) -> ResolvedModel {
    let fallback = ResolvedModel {
        name: default_model.to_string(),
        source: ModelSource::Default,
    };

    let models = match provider.list_models(api_key).await {
        Ok(models) => models,
        Err(e) => {
            warn!("Model discovery failed, using default {default_model}: {e}");
            return fallback;
        }
    };

    match pick_fast_model(&models) {
        Some(name) => {
            debug!("Discovered model {name}");
            ResolvedModel {
                name,
                source: ModelSource::Discovered,
            }
        }
        None => {
            debug!("No {FAST_TIER_MARKER} model listed, using default {default_model}");
            fallback
        }
    }
}

fn pick_fast_model(models: &[ModelInfo]) -> Option<String> {
    models
        .iter()
        .find(|m| m.supports_generation() && m.name.contains(FAST_TIER_MARKER))
        .map(|m| m.name.trim_start_matches("models/").to_string())
}

/// Outcome of the advisory credential check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CredentialStatus {
    Accepted,
    Rejected { http_status: u16 },
    Unreachable { reason: String },
}

/// Lists models purely to tell whether the provider currently accepts the key.
pub async fn check_credential(provider: &dyn ModelProvider, api_key: &str) -> CredentialStatus {
    match provider.list_models(api_key).await {
        Ok(_) => CredentialStatus::Accepted,
        Err(LlmError::Api { status, .. }) => CredentialStatus::Rejected {
            http_status: status,
        },
        Err(e) => CredentialStatus::Unreachable {
            reason: e.to_string(),
        },
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pulls `candidates[0].content.parts[0].text` out of a generate-content body.
fn extract_first_text(body: &str) -> Result<String, LlmError> {
    let envelope: GenerateContentResponse = serde_json::from_str(body)?;

    let candidate = envelope
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedEnvelope("response has no candidates".to_string()))?;
    let content = candidate
        .content
        .ok_or_else(|| LlmError::MalformedEnvelope("first candidate has no content".to_string()))?;
    let part = content
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::MalformedEnvelope("first candidate has no parts".to_string()))?;

    part.text
        .ok_or_else(|| LlmError::MalformedEnvelope("first part has no text".to_string()))
}

/// HTTP client for the Gemini `v1beta` REST API. The key travels as the
/// `key` query parameter on every call.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Uses the transport's default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().build().map_err(LlmError::Http)?,
            base_url: base_url.into(),
        })
    }

    fn models_url(&self) -> String {
        format!("{}/v1beta/models", self.base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:{GENERATE_METHOD}", self.base_url)
    }
}

/// The request URL carries the key, so it is dropped from transport errors.
fn scrub(e: reqwest::Error) -> LlmError {
    LlmError::Http(e.without_url())
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn list_models(&self, api_key: &str) -> Result<Vec<ModelInfo>, LlmError> {
        let response = self
            .client
            .get(self.models_url())
            .query(&[("key", api_key)])
            .send()
            .await
            .map_err(scrub)?;

        let status = response.status();
        let body = response.text().await.map_err(scrub)?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let list: ModelList = serde_json::from_str(&body)?;
        Ok(list.models)
    }

    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: RESPONSE_MIME_TYPE,
            },
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(scrub)?;

        let status = response.status();
        let body = response.text().await.map_err(scrub)?;
        if !status.is_success() {
            warn!("Gemini returned {status} for model {model}");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Gemini call succeeded: model={model}, bytes={}", body.len());
        extract_first_text(&body)
    }
}
