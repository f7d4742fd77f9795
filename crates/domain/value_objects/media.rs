use anyhow::{Result, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use super::enums::media_kinds::MediaKind;

pub const MAX_MEDIA_BYTES: usize = 50 * 1024 * 1024;

/// A still image taken from the ad. Images are a single frame at 0s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaFrame {
    #[serde(default)]
    pub timestamp_secs: f64,
    pub mime_type: String,
    pub data_base64: String,
    pub width: u32,
    pub height: u32,
}

impl MediaFrame {
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }

    pub fn validate(&self) -> Result<()> {
        validate_image_payload(&self.mime_type, &self.data_base64)?;
        if self.width == 0 || self.height == 0 {
            bail!("frame dimensions must be non-zero");
        }
        if !self.timestamp_secs.is_finite() || self.timestamp_secs < 0.0 {
            bail!("frame timestamp must be a non-negative number");
        }
        Ok(())
    }
}

/// Reference brand logo sent alongside the ad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogoImage {
    pub mime_type: String,
    pub data_base64: String,
}

impl LogoImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data_base64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdMedia {
    pub kind: MediaKind,
    pub frames: Vec<MediaFrame>,
    #[serde(default)]
    pub logos: Vec<LogoImage>,
}

impl AdMedia {
    pub fn has_logos(&self) -> bool {
        !self.logos.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.frames.is_empty() {
            bail!("at least one frame is required");
        }
        if self.kind == MediaKind::Image && self.frames.len() != 1 {
            bail!("an image ad must carry exactly one frame");
        }
        for frame in &self.frames {
            frame.validate()?;
        }
        for logo in &self.logos {
            validate_image_payload(&logo.mime_type, &logo.data_base64)?;
        }
        Ok(())
    }
}

fn validate_image_payload(mime_type: &str, data_base64: &str) -> Result<()> {
    if !mime_type.starts_with("image/") {
        bail!("unsupported mime type: {mime_type}");
    }
    let bytes = STANDARD.decode(data_base64.trim())?;
    if bytes.is_empty() {
        bail!("image payload is empty");
    }
    if bytes.len() > MAX_MEDIA_BYTES {
        bail!("image payload exceeds {} bytes", MAX_MEDIA_BYTES);
    }
    Ok(())
}
