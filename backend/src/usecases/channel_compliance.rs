use std::sync::Arc;

use crates::{
    analysis::{
        aggregation::aggregate_guideline_results,
        channel_rules::{
            apply_vertical_format_override, batches, conservative_results, logo_window_frames,
        },
        prompts::{batch_compliance_prompt, image_compliance_prompt},
        response_parser::{parse_batch_response, parse_image_response},
    },
    domain::value_objects::{
        compliance::{ChannelComplianceReport, FrameCounts, GuidelineResult, PlatformComplianceReport},
        enums::{media_kinds::MediaKind, platforms::Platform},
        guidelines::{Guideline, GuidelineFilter, applicable_guidelines},
        media::{AdMedia, LogoImage, MediaFrame},
    },
    llm::{LlmGateway, LlmRequest},
};
use tracing::{debug, info, warn};

use super::llm_runner::{AnalysisError, LlmRunner, UseCaseResult, validate_media};

/// Keeps the recognised platform names, in request order, without duplicates.
pub fn resolve_platforms(requested: &[String]) -> UseCaseResult<Vec<Platform>> {
    let mut platforms = Vec::new();
    for name in requested {
        match Platform::from_str(name.trim()) {
            Some(platform) if !platforms.contains(&platform) => platforms.push(platform),
            Some(_) => {}
            None => warn!(platform = %name, "channel_compliance: ignoring unknown platform"),
        }
    }

    if platforms.is_empty() {
        return Err(AnalysisError::NoValidPlatforms);
    }
    Ok(platforms)
}

pub struct ChannelComplianceUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    runner: Arc<LlmRunner<L>>,
}

impl<L> ChannelComplianceUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(runner: Arc<LlmRunner<L>>) -> Self {
        Self { runner }
    }

    pub async fn analyze(
        &self,
        media: &AdMedia,
        platforms: &[String],
        ad_description: &str,
    ) -> UseCaseResult<ChannelComplianceReport> {
        validate_media(media)?;
        let platforms = resolve_platforms(platforms)?;
        info!(
            media_kind = %media.kind,
            platform_count = platforms.len(),
            frame_count = media.frames.len(),
            "channel_compliance: starting analysis"
        );

        let mut reports = Vec::with_capacity(platforms.len());
        for platform in platforms {
            let report = match media.kind {
                MediaKind::Video => self.analyze_video(platform, media, ad_description).await,
                MediaKind::Image => self.analyze_image(platform, media, ad_description).await,
            };
            info!(
                platform = %platform,
                score = report.compliance_score,
                "channel_compliance: platform analysed"
            );
            reports.push(report);
        }

        Ok(ChannelComplianceReport::new(media.kind, reports))
    }

    async fn analyze_video(
        &self,
        platform: Platform,
        media: &AdMedia,
        ad_description: &str,
    ) -> PlatformComplianceReport {
        let cap = self.runner.settings().max_frames_per_video;
        let frames = &media.frames[..media.frames.len().min(cap)];
        let mut counts = FrameCounts {
            frames_analyzed: frames.len(),
            ..FrameCounts::default()
        };
        let mut results = Vec::new();

        if media.has_logos() {
            let logo_guidelines =
                applicable_guidelines(platform, MediaKind::Video, GuidelineFilter::OnlyLogo, true);
            if !logo_guidelines.is_empty() {
                let window = logo_window_frames(platform, frames);
                counts.logo_frames_analyzed = window.len();
                results.extend(
                    self.run_batches(platform, &logo_guidelines, &window, &media.logos, ad_description)
                        .await,
                );
            }
        }

        let general_guidelines = applicable_guidelines(
            platform,
            MediaKind::Video,
            GuidelineFilter::ExcludeLogo,
            media.has_logos(),
        );
        let all_frames: Vec<&MediaFrame> = frames.iter().collect();
        counts.general_frames_analyzed = all_frames.len();
        results.extend(
            self.run_batches(platform, &general_guidelines, &all_frames, &[], ad_description)
                .await,
        );

        let aggregated = aggregate_guideline_results(&results);
        let mut report = PlatformComplianceReport::new(platform, aggregated, counts);
        if apply_vertical_format_override(&mut report, MediaKind::Video, frames) {
            info!(platform = %platform, "channel_compliance: video is not vertical");
        }
        report
    }

    async fn analyze_image(
        &self,
        platform: Platform,
        media: &AdMedia,
        ad_description: &str,
    ) -> PlatformComplianceReport {
        let guidelines =
            applicable_guidelines(platform, MediaKind::Image, GuidelineFilter::All, media.has_logos());

        let mut request = LlmRequest::new().text(image_compliance_prompt(
            platform,
            &guidelines,
            ad_description,
            media.logos.len(),
        ));
        for frame in &media.frames {
            request = request.image(frame.data_url());
        }
        for logo in &media.logos {
            request = request.image(logo.data_url());
        }

        let results = match self.runner.generate(request).await {
            Ok(text) => parse_image_response(&text, &guidelines),
            Err(err) => {
                warn!(platform = %platform, error = %err, "channel_compliance: image request failed");
                conservative_results(&guidelines)
            }
        };

        let counts = FrameCounts {
            frames_analyzed: media.frames.len(),
            logo_frames_analyzed: 0,
            general_frames_analyzed: media.frames.len(),
        };
        let mut report = PlatformComplianceReport::new(platform, results, counts);
        apply_vertical_format_override(&mut report, MediaKind::Image, &media.frames);
        report
    }

    async fn run_batches(
        &self,
        platform: Platform,
        guidelines: &[Guideline],
        frames: &[&MediaFrame],
        logos: &[LogoImage],
        ad_description: &str,
    ) -> Vec<GuidelineResult> {
        if guidelines.is_empty() || frames.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for batch in batches(frames, self.runner.settings().batch_size) {
            let mut pending = vec![batch];
            while let Some(chunk) = pending.pop() {
                let request = batch_request(platform, guidelines, &chunk, logos, ad_description);

                if request.content_len() > self.runner.settings().max_request_chars && chunk.len() > 1 {
                    let (first, second) = chunk.split_at(chunk.len() / 2);
                    debug!(
                        platform = %platform,
                        frames = chunk.len(),
                        "channel_compliance: splitting oversized batch"
                    );
                    pending.push(second.to_vec());
                    pending.push(first.to_vec());
                    continue;
                }

                results.extend(self.analyze_chunk(platform, guidelines, chunk.len(), request).await);
            }
        }
        results
    }

    async fn analyze_chunk(
        &self,
        platform: Platform,
        guidelines: &[Guideline],
        frame_count: usize,
        request: LlmRequest,
    ) -> Vec<GuidelineResult> {
        let text = match self.runner.generate(request).await {
            Ok(text) => text,
            Err(err) => {
                warn!(platform = %platform, error = %err, "channel_compliance: batch request failed");
                return conservative_results(guidelines);
            }
        };

        match parse_batch_response(&text, frame_count, guidelines) {
            Ok(results) => results,
            Err(err) => {
                warn!(platform = %platform, error = %err, "channel_compliance: batch response unreadable");
                conservative_results(guidelines)
            }
        }
    }
}

fn batch_request(
    platform: Platform,
    guidelines: &[Guideline],
    frames: &[&MediaFrame],
    logos: &[LogoImage],
    ad_description: &str,
) -> LlmRequest {
    let timestamps: Vec<f64> = frames.iter().map(|frame| frame.timestamp_secs).collect();
    let mut request = LlmRequest::new().text(batch_compliance_prompt(
        platform,
        guidelines,
        &timestamps,
        ad_description,
        !logos.is_empty(),
    ));
    for frame in frames {
        request = request.image(frame.data_url());
    }
    for logo in logos {
        request = request.image(logo.data_url());
    }
    request
}
