use std::{sync::Arc, time::Duration};

use axum::http::StatusCode;
use crates::{
    analysis::response_parser::ResponseParseError,
    domain::value_objects::{
        enums::features::Feature, media::AdMedia, plan_selections::LedgerViolation,
    },
    llm::{
        LlmError, LlmGateway, LlmRequest, RetryPolicy, generate_with_retry,
        rate_limiter::RateLimiter,
    },
};
use thiserror::Error;

use crate::config::config_model::Llm;

/// Serialised request size above which a frame batch is split in two.
pub const MAX_REQUEST_CHARS: usize = 800_000;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid media: {0}")]
    InvalidMedia(String),
    #[error("no valid platforms in request")]
    NoValidPlatforms,
    #[error("no plan selected")]
    PlanNotFound,
    #[error("feature not included in plan: {0}")]
    FeatureNotInPlan(Feature),
    #[error(transparent)]
    Quota(#[from] LedgerViolation),
    #[error("model response missing {0}")]
    MissingSection(&'static str),
    #[error("every analysis failed: {0}")]
    AllSectionsFailed(String),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Parse(#[from] ResponseParseError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidMedia(_) | AnalysisError::NoValidPlatforms => {
                StatusCode::BAD_REQUEST
            }
            AnalysisError::PlanNotFound => StatusCode::NOT_FOUND,
            AnalysisError::FeatureNotInPlan(_) => StatusCode::FORBIDDEN,
            AnalysisError::Quota(LedgerViolation::MonthlyLimitReached { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AnalysisError::Quota(_) => StatusCode::BAD_REQUEST,
            AnalysisError::Llm(err) if err.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            AnalysisError::MissingSection(_)
            | AnalysisError::AllSectionsFailed(_)
            | AnalysisError::Llm(_)
            | AnalysisError::Parse(_) => StatusCode::BAD_GATEWAY,
            AnalysisError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub batch_size: usize,
    pub max_frames_per_video: usize,
    pub max_request_chars: usize,
    pub rate_limit_delay: Duration,
    pub retry: RetryPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            max_frames_per_video: 25,
            max_request_chars: MAX_REQUEST_CHARS,
            rate_limit_delay: Duration::from_secs(3),
            retry: RetryPolicy::default(),
        }
    }
}

impl From<&Llm> for AnalysisSettings {
    fn from(config: &Llm) -> Self {
        let rate_limit_delay = Duration::from_millis(config.rate_limit_delay_ms);
        Self {
            batch_size: config.batch_size.max(1),
            max_frames_per_video: config.max_frames_per_video.max(1),
            max_request_chars: MAX_REQUEST_CHARS,
            rate_limit_delay,
            retry: RetryPolicy {
                max_attempts: config.max_retries.max(1),
                delay: rate_limit_delay,
            },
        }
    }
}

/// The model gateway plus the pacing every analysis shares.
pub struct LlmRunner<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    gateway: Arc<L>,
    limiter: RateLimiter,
    settings: AnalysisSettings,
}

impl<L> LlmRunner<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(gateway: Arc<L>, settings: AnalysisSettings) -> Self {
        Self {
            gateway,
            limiter: RateLimiter::new(settings.rate_limit_delay),
            settings,
        }
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub async fn generate(&self, request: LlmRequest) -> Result<String, LlmError> {
        generate_with_retry(
            self.gateway.as_ref(),
            &self.limiter,
            &self.settings.retry,
            request,
        )
        .await
    }

    /// Appends the ad frames (capped) followed by the reference logos.
    pub fn with_media(&self, mut request: LlmRequest, media: &AdMedia) -> LlmRequest {
        for frame in media.frames.iter().take(self.settings.max_frames_per_video) {
            request = request.image(frame.data_url());
        }
        for logo in &media.logos {
            request = request.image(logo.data_url());
        }
        request
    }
}

pub(crate) fn validate_media(media: &AdMedia) -> UseCaseResult<()> {
    media
        .validate()
        .map_err(|err| AnalysisError::InvalidMedia(err.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_model::Llm;

    #[test]
    fn settings_follow_llm_config() {
        let config = Llm {
            base_url: "http://localhost".to_string(),
            api_key: "key".to_string(),
            model: "model".to_string(),
            temperature: 0.2,
            top_p: 0.1,
            request_timeout_secs: 60,
            rate_limit_delay_ms: 1500,
            max_retries: 0,
            batch_size: 0,
            max_frames_per_video: 12,
        };

        let settings = AnalysisSettings::from(&config);
        assert_eq!(settings.batch_size, 1);
        assert_eq!(settings.max_frames_per_video, 12);
        assert_eq!(settings.rate_limit_delay, Duration::from_millis(1500));
        assert_eq!(settings.retry.max_attempts, 1);
        assert_eq!(settings.retry.delay, Duration::from_millis(1500));
    }

    #[test]
    fn quota_errors_map_to_http_statuses() {
        let limit = AnalysisError::Quota(LedgerViolation::MonthlyLimitReached {
            ads_used: 4,
            max_ads_per_month: 4,
        });
        assert_eq!(limit.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AnalysisError::Quota(LedgerViolation::NoAdsRemaining).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AnalysisError::Llm(LlmError::RateLimited("slow down".to_string())).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AnalysisError::Llm(LlmError::InvalidResponse("empty".to_string())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
