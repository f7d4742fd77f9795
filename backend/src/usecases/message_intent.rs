use std::sync::Arc;

use crates::{
    analysis::{prompts::message_intent_prompt, response_parser::parse_message_intent},
    domain::value_objects::{media::AdMedia, message_intent::MessageIntentReport},
    llm::{LlmGateway, LlmRequest},
};
use tracing::{info, warn};

use super::llm_runner::{LlmRunner, UseCaseResult, validate_media};

const UNSPECIFIED_FUNNEL: &str = "Not specified";

pub struct MessageIntentUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    runner: Arc<LlmRunner<L>>,
}

impl<L> MessageIntentUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(runner: Arc<LlmRunner<L>>) -> Self {
        Self { runner }
    }

    pub async fn analyze(
        &self,
        media: &AdMedia,
        ad_description: &str,
        funnel_type: Option<&str>,
    ) -> UseCaseResult<MessageIntentReport> {
        validate_media(media)?;
        let user_selected_type = funnel_type
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(UNSPECIFIED_FUNNEL);

        let prompt = message_intent_prompt(ad_description, user_selected_type);
        let request = self.runner.with_media(LlmRequest::new().text(prompt), media);

        let text = self.runner.generate(request).await.map_err(|err| {
            warn!(error = %err, "message_intent: model request failed");
            err
        })?;
        let mut report = parse_message_intent(&text).map_err(|err| {
            warn!(error = %err, "message_intent: response unreadable");
            err
        })?;
        report.apply_user_selection(user_selected_type);

        info!(
            intent_score = report.message_intent.intent_compliance_score,
            classification = %report.funnel_compatibility.classification,
            matched = report.funnel_compatibility.match_with_user_selection,
            "message_intent: analysis complete"
        );
        Ok(report)
    }
}
