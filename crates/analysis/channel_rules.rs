use crate::domain::value_objects::{
    compliance::{GuidelineResult, PlatformComplianceReport},
    enums::{answers::Answer, media_kinds::MediaKind, platforms::Platform},
    guidelines::Guideline,
    media::MediaFrame,
};

pub const QUOTA_DEFAULT_REASON: &str = "API quota exceeded - defaulting to No";
pub const NOT_VERTICAL_VIDEO_REASON: &str = "Video is not in vertical (portrait) format";
pub const NOT_VERTICAL_IMAGE_REASON: &str = "Image is not in vertical (portrait) format";

/// Stand-in verdicts when a batch could not be analysed: every non-logo
/// guideline of the pass answered `No`.
pub fn conservative_results(guidelines: &[Guideline]) -> Vec<GuidelineResult> {
    guidelines
        .iter()
        .filter(|guideline| !guideline.is_logo())
        .map(|guideline| GuidelineResult::new(guideline, Answer::No, QUOTA_DEFAULT_REASON))
        .collect()
}

/// Frames that fall inside the platform's logo window.
pub fn logo_window_frames(platform: Platform, frames: &[MediaFrame]) -> Vec<&MediaFrame> {
    match platform.logo_window_secs() {
        Some(window) => frames
            .iter()
            .filter(|frame| frame.timestamp_secs <= window)
            .collect(),
        None => frames.iter().collect(),
    }
}

/// Splits `frames` into chunks of at most `batch_size`.
pub fn batches<'a>(frames: &[&'a MediaFrame], batch_size: usize) -> Vec<Vec<&'a MediaFrame>> {
    frames
        .chunks(batch_size.max(1))
        .map(<[&MediaFrame]>::to_vec)
        .collect()
}

/// Rewrites the vertical format verdict from the measured frame dimensions.
/// Any landscape or square frame fails it. Returns whether a result changed.
pub fn apply_vertical_format_override(
    report: &mut PlatformComplianceReport,
    media_kind: MediaKind,
    frames: &[MediaFrame],
) -> bool {
    if report.platform != Platform::TikTok || frames.is_empty() {
        return false;
    }
    if frames.iter().all(MediaFrame::is_portrait) {
        return false;
    }

    let reason = match media_kind {
        MediaKind::Video => NOT_VERTICAL_VIDEO_REASON,
        MediaKind::Image => NOT_VERTICAL_IMAGE_REASON,
    };

    let mut changed = false;
    for result in report
        .guideline_results
        .iter_mut()
        .filter(|result| result.guideline.to_ascii_lowercase().contains("vertical"))
    {
        result.override_output(Answer::No, reason);
        changed = true;
    }

    if changed {
        report.recompute();
    }
    changed
}
