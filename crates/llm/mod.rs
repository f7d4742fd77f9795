pub mod llm_client;
pub mod rate_limiter;

use async_trait::async_trait;
use mockall::automock;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use rate_limiter::RateLimiter;

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// `data:<mime>;base64,<payload>`
    ImageDataUrl(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmRequest {
    pub parts: Vec<ContentPart>,
}

impl LlmRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }

    pub fn image(mut self, data_url: impl Into<String>) -> Self {
        self.parts.push(ContentPart::ImageDataUrl(data_url.into()));
        self
    }

    /// Characters the request carries, used to keep batches under the
    /// provider's payload limit.
    pub fn content_len(&self) -> usize {
        self.parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => text.len(),
                ContentPart::ImageDataUrl(url) => url.len(),
            })
            .sum()
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("rate limited by model provider: {0}")]
    RateLimited(String),
    #[error("model provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl LlmError {
    pub fn is_rate_limited(&self) -> bool {
        match self {
            LlmError::RateLimited(_) => true,
            LlmError::Api { status, body } => {
                *status == 429 || body.to_ascii_lowercase().contains("quota")
            }
            _ => false,
        }
    }
}

#[async_trait]
#[automock]
pub trait LlmGateway {
    async fn generate(&self, request: LlmRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(3),
        }
    }
}

/// Sends `request` through the limiter, retrying on failure. Quota errors back
/// off linearly (`delay * attempt`); other errors wait `delay`. The last error
/// is returned once every attempt is spent.
pub async fn generate_with_retry<G>(
    gateway: &G,
    limiter: &RateLimiter,
    policy: &RetryPolicy,
    request: LlmRequest,
) -> Result<String, LlmError>
where
    G: LlmGateway + Send + Sync + ?Sized,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        limiter.wait().await;

        let err = match gateway.generate(request.clone()).await {
            Ok(text) => return Ok(text),
            Err(err) => err,
        };

        if attempt >= attempts {
            warn!(attempt, error = %err, "llm: all attempts failed");
            return Err(err);
        }

        let wait = if err.is_rate_limited() {
            policy.delay * attempt
        } else {
            policy.delay
        };
        warn!(attempt, wait_ms = wait.as_millis() as u64, error = %err, "llm: retrying request");
        tokio::time::sleep(wait).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    };

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn quota_messages_count_as_rate_limits() {
        let err = LlmError::Api {
            status: 403,
            body: "Quota exceeded for project".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!LlmError::InvalidResponse("empty".to_string()).is_rate_limited());
    }

    #[tokio::test]
    async fn retries_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().times(2).returning(move |_| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if call == 0 {
                    Err(LlmError::RateLimited("429".to_string()))
                } else {
                    Ok("[]".to_string())
                }
            })
        });

        let limiter = RateLimiter::new(Duration::ZERO);
        let text = generate_with_retry(&gateway, &limiter, &fast_policy(2), LlmRequest::new().text("hi"))
            .await
            .unwrap();

        assert_eq!(text, "[]");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returns_last_error_when_attempts_run_out() {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_generate().times(3).returning(|_| {
            Box::pin(async {
                Err(LlmError::Api {
                    status: 500,
                    body: "boom".to_string(),
                })
            })
        });

        let limiter = RateLimiter::new(Duration::ZERO);
        let err = generate_with_retry(&gateway, &limiter, &fast_policy(3), LlmRequest::new())
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    #[test]
    fn content_len_counts_text_and_images() {
        let request = LlmRequest::new().text("abc").image("data:image/png;base64,AAAA");
        assert_eq!(request.content_len(), 3 + "data:image/png;base64,AAAA".len());
    }
}
