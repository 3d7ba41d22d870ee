// crates/core/src/format.rs
//! Quality → format policy.
//!
//! Up to 1080p we prefer MP4 (H.264 + AAC) so the file plays everywhere.
//! Above that YouTube only serves VP9/AV1, so we prefer WebM (VP9 + Opus).
//! Each tier carries a fallback chain; the order decides which artifact the
//! engine actually produces and must not be rearranged.

use serde::Serialize;

use crate::error::QualityError;

/// Quality used when the caller does not send one.
pub const DEFAULT_QUALITY: &str = "2160";

/// Highest height still served as MP4.
pub const MP4_MAX_HEIGHT: u32 = 1080;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Webm,
}

impl Container {
    /// Value for the engine's merge-output-format option.
    pub fn merge_format(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Webm => "webm",
        }
    }

    /// Label shown to the user.
    pub fn label(self) -> &'static str {
        match self {
            Container::Mp4 => "MP4",
            Container::Webm => "WebM",
        }
    }
}

/// What to ask the engine for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSelection {
    pub max_height: u32,
    pub container: Container,
    /// yt-dlp format selector with `/`-separated fallbacks.
    pub selector: String,
}

/// Parse a quality hint (a height ceiling such as `"1080"`) into a format
/// selection.
pub fn select_format(quality: &str) -> Result<FormatSelection, QualityError> {
    let trimmed = quality.trim();
    let height = trimmed
        .trim_end_matches(['p', 'P'])
        .parse::<u32>()
        .ok()
        .filter(|h| *h > 0)
        .ok_or_else(|| QualityError::Unsupported(trimmed.to_string()))?;

    Ok(if height <= MP4_MAX_HEIGHT {
        FormatSelection {
            max_height: height,
            container: Container::Mp4,
            selector: format!(
                "bestvideo[height<={height}][ext=mp4][vcodec^=avc]+bestaudio[ext=m4a]/\
                 bestvideo[height<={height}][ext=mp4]+bestaudio[ext=m4a]/\
                 best[height<={height}][ext=mp4]"
            ),
        }
    } else {
        FormatSelection {
            max_height: height,
            container: Container::Webm,
            selector: format!(
                "bestvideo[height<={height}][ext=webm]+bestaudio[ext=webm]/\
                 bestvideo[height<={height}]+bestaudio/\
                 best[height<={height}]"
            ),
        }
    })
}
