//! Boundary to the external language-model service.
//!
//! The service is a collaborator, not part of this crate: requests carry
//! serialized context plus an instruction, responses are either free text or a
//! JSON document that must parse back into a known record type. Timeout and
//! retry policy are injected here because the call is a blocking, unretried
//! round-trip otherwise.

pub mod openai;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use crate::error::LlmError;
use crate::models::OptInput;

pub use openai::HttpTransport;

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

/// Connection settings for the language-model service, read from the process
/// environment (`.env` files are honored by the binary before this runs).
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
}

impl LlmSettings {
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key =
            env::var(API_KEY_ENV_VAR).map_err(|_| LlmError::MissingCredential(API_KEY_ENV_VAR))?;
        Ok(LlmSettings {
            api_key,
            model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                env_parse("LLM_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_retries: env_parse("LLM_MAX_RETRIES").unwrap_or(DEFAULT_MAX_RETRIES),
            retry_backoff: Duration::from_millis(
                env_parse("LLM_RETRY_BACKOFF_MS").unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
            ),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// A single completion round-trip.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    /// When set, the service is asked for a JSON-object response.
    pub expect_json: bool,
}

/// Transport abstraction for the completion service. The HTTP implementation
/// lives in [`openai`]; tests plug in scripted transports.
pub trait CompletionTransport: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

/// Client wrapping a transport with the injected retry policy.
pub struct LlmClient {
    transport: Arc<dyn CompletionTransport>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl LlmClient {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(
            Arc::new(transport),
            settings.max_retries,
            settings.retry_backoff,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn CompletionTransport>,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        LlmClient {
            transport,
            max_retries,
            retry_backoff,
        }
    }

    /// Free-text answer to `query`, given the serialized model context.
    pub fn answer(&self, query: &str, context: &str) -> Result<String, LlmError> {
        let request = CompletionRequest {
            system: Some(
                "You are an assistant that answers questions about a mathematical \
                 optimization model. Base your answers only on the provided input data, \
                 output data and model metadata."
                    .to_string(),
            ),
            prompt: format!("{}\n\n{}", context, query),
            expect_json: false,
        };
        self.complete_with_retry(&request)
    }

    /// Structured transform: ask the service to rewrite `current` according to
    /// the natural-language `query` and parse the reply back into the same
    /// record type. No validation happens here beyond the record's own field
    /// types; a semantically nonsensical transform surfaces downstream as
    /// solver infeasibility.
    pub fn transform<T: OptInput>(&self, query: &str, current: &T) -> Result<T, LlmError> {
        let current_json =
            serde_json::to_string(current).map_err(|e| LlmError::Schema(e.to_string()))?;
        let request = CompletionRequest {
            system: Some(
                "You rewrite JSON data records for an optimization model. Respond with a \
                 single JSON object with exactly the same schema as the record you are \
                 given. Do not add or remove fields."
                    .to_string(),
            ),
            prompt: format!(
                "{}\nNow the user wants to: {}. Change the data at the appropriate places \
                 and return the full updated record.",
                current_json, query
            ),
            expect_json: true,
        };
        let reply = self.complete_with_retry(&request)?;
        serde_json::from_str(strip_code_fences(&reply))
            .map_err(|e| LlmError::Schema(e.to_string()))
    }

    fn complete_with_retry(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.transport.complete(request) {
                Ok(text) => return Ok(text),
                Err(err) if err.is_retriable() && attempt < self.max_retries => {
                    attempt += 1;
                    log::warn!(
                        "LLM call failed ({}), retrying {}/{}",
                        err,
                        attempt,
                        self.max_retries
                    );
                    std::thread::sleep(self.retry_backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Models often wrap JSON replies in markdown code fences even in JSON mode.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open.strip_suffix("```").unwrap_or(without_open).trim()
}
