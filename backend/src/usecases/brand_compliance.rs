use std::sync::Arc;

use crates::{
    analysis::{prompts::brand_compliance_prompt, response_parser::parse_question_answers},
    domain::value_objects::{
        brand_compliance::{BRAND_QUESTIONS, BrandComplianceReport, BrandGuidelines, is_known_tone},
        media::AdMedia,
    },
    llm::{LlmGateway, LlmRequest},
};
use tracing::{info, warn};

use super::llm_runner::{LlmRunner, UseCaseResult, validate_media};

pub struct BrandComplianceUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    runner: Arc<LlmRunner<L>>,
}

impl<L> BrandComplianceUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(runner: Arc<LlmRunner<L>>) -> Self {
        Self { runner }
    }

    pub async fn analyze(
        &self,
        media: &AdMedia,
        brand: &BrandGuidelines,
    ) -> UseCaseResult<BrandComplianceReport> {
        validate_media(media)?;
        for tone in brand.tones.iter().filter(|tone| !is_known_tone(tone)) {
            warn!(tone = %tone, "brand_compliance: tone outside the known list");
        }

        let prompt = brand_compliance_prompt(media.logos.len(), brand);
        let request = self.runner.with_media(LlmRequest::new().text(prompt), media);

        let text = self.runner.generate(request).await.map_err(|err| {
            warn!(error = %err, "brand_compliance: model request failed");
            err
        })?;
        let answers = parse_question_answers(&text, BRAND_QUESTIONS.len()).map_err(|err| {
            warn!(error = %err, "brand_compliance: response unreadable");
            err
        })?;

        let report = BrandComplianceReport::from_answers(&answers);
        info!(
            score = report.compliance_score,
            level = %report.compliance_level,
            "brand_compliance: analysis complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::llm_runner::{
        AnalysisError,
        test_support::{fast_settings, frame, video},
    };
    use crates::{
        domain::value_objects::enums::compliance_levels::ComplianceLevel,
        llm::{ContentPart, MockLlmGateway},
    };

    fn usecase(gateway: MockLlmGateway) -> BrandComplianceUseCase<MockLlmGateway> {
        BrandComplianceUseCase::new(Arc::new(LlmRunner::new(Arc::new(gateway), fast_settings())))
    }

    fn brand() -> BrandGuidelines {
        BrandGuidelines {
            colors: vec!["red".to_string(), "white".to_string()],
            tones: vec!["Playful".to_string()],
            transcript: None,
        }
    }

    #[tokio::test]
    async fn scores_five_answers() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .withf(|request| {
                // prompt, one frame, one logo
                request.parts.len() == 3
                    && matches!(&request.parts[0], ContentPart::Text(text) if text.contains("red, white"))
            })
            .times(1)
            .returning(|_| {
                Box::pin(async {
                    Ok("Q1: Yes\nQ2: Yes\nQ3: No\nQ4: Yes\nQ5: yes".to_string())
                })
            });

        let media = video(vec![frame(0.0, 1080, 1920)], true);
        let report = usecase(gateway).analyze(&media, &brand()).await.unwrap();

        assert_eq!(report.total_questions, 5);
        assert_eq!(report.total_matched, 4);
        assert_eq!(report.compliance_score, 80.0);
        assert_eq!(report.compliance_level, ComplianceLevel::High);
    }

    #[tokio::test]
    async fn short_answer_list_is_an_error() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_generate()
            .returning(|_| Box::pin(async { Ok("Q1: Yes\nQ2: No".to_string()) }));

        let media = video(vec![frame(0.0, 1080, 1920)], false);
        let result = usecase(gateway).analyze(&media, &brand()).await;
        assert!(matches!(result, Err(AnalysisError::Parse(_))));
    }
}
