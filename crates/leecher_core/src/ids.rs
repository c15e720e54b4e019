use std::fmt;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Largest accepted video id. The platform issues ids that fit a signed
/// 32-bit integer; anything above is treated as a parse failure.
pub const MAX_VIDEO_ID: u32 = i32::MAX as u32;

/// A positive platform video id, at most [`MAX_VIDEO_ID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VideoId(u32);

impl VideoId {
    pub fn new(value: u32) -> Result<Self, ParseIdError> {
        match value {
            0 => Err(ParseIdError::NotPositive),
            v if v > MAX_VIDEO_ID => Err(ParseIdError::TooLarge),
            v => Ok(Self(v)),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Parses a single token, ignoring surrounding whitespace.
    pub fn parse(token: &str) -> Result<Self, ParseIdError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ParseIdError::Empty);
        }
        let value: i64 = token.parse().map_err(|err: std::num::ParseIntError| {
            match err.kind() {
                IntErrorKind::PosOverflow => ParseIdError::TooLarge,
                IntErrorKind::NegOverflow => ParseIdError::NotPositive,
                _ => ParseIdError::NotANumber(token.to_string()),
            }
        })?;
        if value <= 0 {
            return Err(ParseIdError::NotPositive);
        }
        let value = u32::try_from(value).map_err(|_| ParseIdError::TooLarge)?;
        Self::new(value)
    }
}

impl TryFrom<u32> for VideoId {
    type Error = ParseIdError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VideoId> for u32 {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("empty id")]
    Empty,
    #[error("not a number: {0}")]
    NotANumber(String),
    #[error("id must be positive")]
    NotPositive,
    #[error("id exceeds {}", MAX_VIDEO_ID)]
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlIdError {
    #[error("not an absolute url: {0}")]
    NotAbsolute(String),
    #[error("no video segment in path")]
    MissingVideoSegment,
    #[error("video segment not followed by an id")]
    MissingId,
    #[error("invalid id: {0}")]
    InvalidId(#[from] ParseIdError),
}

/// Splits user text on line breaks, dropping blank lines.
pub fn non_blank_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines().filter(|line| !line.trim().is_empty())
}

/// Extracts the id from a video url such as `https://host/videos/123456`.
///
/// Only the first `video`/`videos` path segment (any case) is considered; the
/// segment after it must hold the id.
pub fn video_id_from_url(raw: &str) -> Result<VideoId, UrlIdError> {
    let url = Url::parse(raw.trim()).map_err(|_| UrlIdError::NotAbsolute(raw.to_string()))?;
    let segments: Vec<&str> = url
        .path_segments()
        .ok_or_else(|| UrlIdError::NotAbsolute(raw.to_string()))?
        .collect();

    // A trailing slash yields an empty last segment, so "videos" must have a
    // successor to count as a directory segment.
    let position = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .position(|segment| {
            segment.eq_ignore_ascii_case("video") || segment.eq_ignore_ascii_case("videos")
        })
        .ok_or(UrlIdError::MissingVideoSegment)?;

    let candidate = segments[position + 1].trim_matches('/');
    if candidate.trim().is_empty() {
        return Err(UrlIdError::MissingId);
    }
    Ok(VideoId::parse(candidate)?)
}

/// Parses every non-blank line as a video url. Stops at the first bad line.
pub fn parse_video_urls(raw: &str) -> Result<Vec<VideoId>, UrlIdError> {
    non_blank_lines(raw).map(video_id_from_url).collect()
}

/// Parses every non-blank line as a video id. Stops at the first bad line.
pub fn parse_video_ids(raw: &str) -> Result<Vec<VideoId>, ParseIdError> {
    non_blank_lines(raw).map(VideoId::parse).collect()
}
