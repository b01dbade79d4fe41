//! Blocking HTTP transport speaking the OpenAI chat-completions wire format.

use serde::Deserialize;
use serde_json::json;

use crate::error::LlmError;
use crate::llm::{CompletionRequest, CompletionTransport, LlmSettings};

pub struct HttpTransport {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpTransport {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(HttpTransport {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl CompletionTransport for HttpTransport {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let mut body = json!({ "model": self.model, "messages": messages });
        if request.expect_json {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .map_err(|e| LlmError::Transport(e.to_string()))?;
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| LlmError::Schema(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Schema("completion response had no choices".to_string()))
    }
}
