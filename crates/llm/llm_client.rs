use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{ContentPart, LlmError, LlmGateway, LlmRequest};

/// Connection settings for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub request_timeout: Duration,
}

/// Minimal multimodal chat client built on reqwest.
pub struct LlmHttpClient {
    http: reqwest::Client,
    config: LlmClientConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    top_p: f32,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<MessagePart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl LlmHttpClient {
    pub fn new(config: LlmClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn build_body(&self, request: LlmRequest) -> ChatCompletionRequest<'_> {
        let content = request
            .parts
            .into_iter()
            .map(|part| match part {
                ContentPart::Text(text) => MessagePart::Text { text },
                ContentPart::ImageDataUrl(url) => MessagePart::ImageUrl {
                    image_url: ImageUrl { url },
                },
            })
            .collect();

        ChatCompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        }
    }

    async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = status.as_u16(),
            body = %body,
            "llm_client: request failed"
        );

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited(body));
        }

        Err(LlmError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl LlmGateway for LlmHttpClient {
    async fn generate(&self, request: LlmRequest) -> Result<String, LlmError> {
        let content_len = request.content_len();
        let body = self.build_body(request);

        debug!(
            model = %self.config.model,
            content_len,
            "llm_client: sending chat completion"
        );

        let resp = self
            .http
            .post(self.endpoint())
            .header(AUTHORIZATION, format!("Bearer {}", self.config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let resp = Self::ensure_success(resp).await?;
        let completion: ChatCompletionResponse = resp.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("no completion text returned".to_string()))
    }
}
