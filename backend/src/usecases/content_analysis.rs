use std::sync::Arc;

use crates::{
    analysis::{prompts::PURCHASE_INTENT_PROMPT, score_parser::parse_purchase_intent},
    domain::value_objects::{media::AdMedia, purchase_intent::PurchaseIntentReport},
    llm::{LlmGateway, LlmRequest},
};
use tracing::{info, warn};

use super::llm_runner::{AnalysisError, LlmRunner, UseCaseResult, validate_media};

/// Purchase intent scoring of the ad's content.
pub struct ContentAnalysisUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    runner: Arc<LlmRunner<L>>,
}

impl<L> ContentAnalysisUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(runner: Arc<LlmRunner<L>>) -> Self {
        Self { runner }
    }

    pub async fn analyze(&self, media: &AdMedia) -> UseCaseResult<PurchaseIntentReport> {
        validate_media(media)?;
        let request = self
            .runner
            .with_media(LlmRequest::new().text(PURCHASE_INTENT_PROMPT), media);

        let text = self.runner.generate(request).await.map_err(|err| {
            warn!(error = %err, "content_analysis: model request failed");
            err
        })?;

        let report = parse_purchase_intent(&text);
        if report.purchase_intent_scores.is_empty() {
            warn!("content_analysis: no purchase intent scores in response");
            return Err(AnalysisError::MissingSection("purchase intent scores"));
        }

        info!(
            metrics = report.purchase_intent_scores.len(),
            overall = report.overall_purchase_intent_percentage,
            "content_analysis: analysis complete"
        );
        Ok(report)
    }
}
