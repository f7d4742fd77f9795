use serde::Serialize;

use super::enums::{
    ad_types::AdType, answers::Answer, guideline_inputs::GuidelineInputs,
    media_kinds::MediaKind, platforms::Platform,
};

/// A static entry in a platform's advertising policy catalog.
#[derive(Debug)]
pub struct GuidelineDefinition {
    pub text: &'static str,
    pub ad_type: AdType,
    pub inputs: GuidelineInputs,
    pub expected: Answer,
}

const fn define(
    text: &'static str,
    ad_type: AdType,
    inputs: GuidelineInputs,
    expected: Answer,
) -> GuidelineDefinition {
    GuidelineDefinition {
        text,
        ad_type,
        inputs,
        expected,
    }
}

const RESTRICTED_GOODS: &str =
    "Does the Ad promote Restricted Goods or Services (Alcohol, Tobacco, Drugs, Gambling, etc.)";
const FRAUD_OR_SCAMS: &str = "Does the Ad promote any Fraud or Scams";
const PROHIBITED_CONTENT: &str = "Does the Ad have any prohibited or sensitive content";

static YOUTUBE: [GuidelineDefinition; 5] = [
    define(
        "Is the Logo or Brand identity visible in the first 5 seconds",
        AdType::Video,
        GuidelineInputs::LogosAndAd,
        Answer::Yes,
    ),
    define(
        "Does the Ad have Any misleading information or offensive visual content",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
    define(RESTRICTED_GOODS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Did the Ad use respectful and inclusive language and imagery",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
    define(
        "Could the content be considered shocking or offensive",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
];

static INSTAGRAM: [GuidelineDefinition; 5] = [
    define(
        "Is the Logo or Brand identity visible in the first 3 seconds",
        AdType::Video,
        GuidelineInputs::LogosAndAd,
        Answer::Yes,
    ),
    define(RESTRICTED_GOODS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(FRAUD_OR_SCAMS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Are there any excessive or disruptive text overlays",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
    define(
        "Are there any explicit or shocking imagery unsuitable for audiences",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
];

static TIKTOK: [GuidelineDefinition; 5] = [
    define(
        "Is the Logo or Brand identity visible in the first 3 seconds",
        AdType::Video,
        GuidelineInputs::LogosAndAd,
        Answer::Yes,
    ),
    define(RESTRICTED_GOODS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Is the Video in a vertical (portrait) format (the aspect ratio should be 9:16)",
        AdType::Video,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
    define(
        "Are there any misleading, violent, or explicit content",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
    define(
        "Does the Ad contain material that is age-appropriate",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
];

static GOOGLE_ADS: [GuidelineDefinition; 5] = [
    define(
        "Do logos or brand identity appear within first 5 seconds",
        AdType::Video,
        GuidelineInputs::LogosAndAd,
        Answer::Yes,
    ),
    define(
        "Does the Ad have any misleading headlines or visuals",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
    define(
        "Does the Ad promote sale of counterfeit goods",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::No,
    ),
    define(PROHIBITED_CONTENT, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Does the Ad use proper grammar and professional language",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
];

static FACEBOOK: [GuidelineDefinition; 5] = [
    define(PROHIBITED_CONTENT, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Did the Ad have minimal use of text-to-image ratio wherein the images are bigger than texts",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
    define(RESTRICTED_GOODS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(FRAUD_OR_SCAMS, AdType::Both, GuidelineInputs::Ad, Answer::No),
    define(
        "Did the ad intend to reach people responsibly without discriminating based on personal traits.",
        AdType::Both,
        GuidelineInputs::Ad,
        Answer::Yes,
    ),
];

pub fn catalog(platform: Platform) -> &'static [GuidelineDefinition] {
    match platform {
        Platform::YouTube => &YOUTUBE,
        Platform::Instagram => &INSTAGRAM,
        Platform::Facebook => &FACEBOOK,
        Platform::TikTok => &TIKTOK,
        Platform::GoogleAds => &GOOGLE_ADS,
    }
}

/// A catalog entry bound to its 1-based position in the platform list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guideline {
    pub number: u32,
    pub text: &'static str,
    pub ad_type: AdType,
    pub inputs: GuidelineInputs,
    pub expected: Answer,
}

impl Guideline {
    pub fn is_logo(&self) -> bool {
        self.inputs.needs_logos()
    }

    pub fn is_vertical_format(&self) -> bool {
        self.text.to_ascii_lowercase().contains("vertical")
    }
}

/// Narrows a platform's guidelines to one analysis pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidelineFilter {
    All,
    OnlyLogo,
    ExcludeLogo,
}

impl GuidelineFilter {
    fn admits(&self, guideline: &Guideline) -> bool {
        match self {
            GuidelineFilter::All => true,
            GuidelineFilter::OnlyLogo => guideline.is_logo(),
            GuidelineFilter::ExcludeLogo => !guideline.is_logo(),
        }
    }
}

pub fn guidelines_for(platform: Platform) -> Vec<Guideline> {
    catalog(platform)
        .iter()
        .enumerate()
        .map(|(index, definition)| Guideline {
            number: index as u32 + 1,
            text: definition.text,
            ad_type: definition.ad_type,
            inputs: definition.inputs,
            expected: definition.expected,
        })
        .collect()
}

/// Guidelines the model should be asked about for this media and pass.
/// Logo guidelines are dropped when no reference logos were supplied.
pub fn applicable_guidelines(
    platform: Platform,
    media_kind: MediaKind,
    filter: GuidelineFilter,
    has_logos: bool,
) -> Vec<Guideline> {
    guidelines_for(platform)
        .into_iter()
        .filter(|guideline| guideline.ad_type.applies_to(media_kind))
        .filter(|guideline| filter.admits(guideline))
        .filter(|guideline| has_logos || !guideline.is_logo())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_platform_has_five_numbered_guidelines() {
        for platform in Platform::ALL {
            let numbers: Vec<u32> = guidelines_for(platform).iter().map(|g| g.number).collect();
            assert_eq!(numbers, vec![1, 2, 3, 4, 5], "platform: {platform}");
        }
    }

    #[test]
    fn logo_guidelines_require_logos() {
        let without = applicable_guidelines(
            Platform::YouTube,
            MediaKind::Video,
            GuidelineFilter::All,
            false,
        );
        assert!(without.iter().all(|g| !g.is_logo()));
        assert_eq!(without.len(), 4);

        let only_logo = applicable_guidelines(
            Platform::YouTube,
            MediaKind::Video,
            GuidelineFilter::OnlyLogo,
            true,
        );
        assert_eq!(only_logo.len(), 1);
        assert_eq!(only_logo[0].number, 1);
    }

    #[test]
    fn video_only_guidelines_are_skipped_for_images() {
        let tiktok = applicable_guidelines(
            Platform::TikTok,
            MediaKind::Image,
            GuidelineFilter::All,
            true,
        );
        let numbers: Vec<u32> = tiktok.iter().map(|g| g.number).collect();
        assert_eq!(numbers, vec![2, 4, 5]);
    }

    #[test]
    fn facebook_has_no_logo_guideline() {
        assert!(guidelines_for(Platform::Facebook).iter().all(|g| !g.is_logo()));
    }
}
