// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by every stage of the resolution cascade.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Minimum size of a media payload. Anything smaller is an error page,
/// a tracking pixel or a truncated transfer, never real media.
pub const MIN_MEDIA_BYTES: usize = 1024;

/// Source platform of a post URL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Pinterest,
    TikTok,
    Instagram,
    Unknown,
}

impl Platform {
    /// The three platforms that have a dedicated resolver.
    pub const SUPPORTED: [Platform; 3] =
        [Platform::Pinterest, Platform::TikTok, Platform::Instagram];
}

/// Broad content type of a media payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Unknown,
}

impl MediaKind {
    /// Default file extension for the kind.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Unknown => "bin",
        }
    }
}

/// A validated payload produced by a strategy, before sniffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    /// Raw body of the media response.
    pub bytes: Vec<u8>,
    /// Direct URL the bytes were fetched from.
    pub source_url: String,
    /// Type declared by the platform, `Unknown` when the strategy has no opinion.
    pub hint: MediaKind,
}

impl FetchedMedia {
    pub fn new(bytes: Vec<u8>, source_url: impl Into<String>) -> Self {
        Self {
            bytes,
            source_url: source_url.into(),
            hint: MediaKind::Unknown,
        }
    }

    pub fn with_hint(mut self, hint: MediaKind) -> Self {
        self.hint = hint;
        self
    }
}

/// Result of one strategy attempt.
///
/// `Found` is never empty: build it through [`StrategyOutcome::from_media`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    Found(Vec<FetchedMedia>),
    NoResult,
}

impl StrategyOutcome {
    pub fn from_media(media: Vec<FetchedMedia>) -> Self {
        if media.is_empty() {
            StrategyOutcome::NoResult
        } else {
            StrategyOutcome::Found(media)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, StrategyOutcome::Found(_))
    }

    pub fn into_media(self) -> Vec<FetchedMedia> {
        match self {
            StrategyOutcome::Found(media) => media,
            StrategyOutcome::NoResult => Vec::new(),
        }
    }
}

/// One downloadable media item. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    #[serde(skip)]
    bytes: Vec<u8>,
    kind: MediaKind,
    source_url: String,
}

impl MediaItem {
    /// Creates an item, rejecting payloads below `min_bytes`.
    pub fn new(
        bytes: Vec<u8>,
        kind: MediaKind,
        source_url: impl Into<String>,
        min_bytes: usize,
    ) -> Option<Self> {
        if bytes.len() < min_bytes {
            return None;
        }
        Some(Self {
            bytes,
            kind,
            source_url: source_url.into(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Suggested upload file name, e.g. `tiktok_1.mp4`.
    pub fn file_name(&self, platform: Platform, index: usize) -> String {
        format!("{platform}_{}.{}", index + 1, self.kind.extension())
    }
}

/// Outcome of one resolution request.
///
/// An empty `items` sequence is the "could not resolve" terminal state and
/// not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaResult {
    pub items: Vec<MediaItem>,
    pub caption: Option<String>,
    pub platform: Platform,
    /// `resolver/strategy` that produced the items.
    pub resolved_by: Option<String>,
}

impl MediaResult {
    pub fn empty(platform: Platform) -> Self {
        Self {
            items: Vec::new(),
            caption: None,
            platform,
            resolved_by: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total payload size across all items.
    pub fn total_bytes(&self) -> usize {
        self.items.iter().map(MediaItem::len).sum()
    }
}
