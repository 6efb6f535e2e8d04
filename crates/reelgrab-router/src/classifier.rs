// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL to platform classification.
//!
//! Pure pattern matching on host and path. No network, no side effects.

use std::sync::LazyLock;

use regex::Regex;
use reelgrab_core::Platform;
use url::Url;

/// Pinterest on `.com`, a country TLD (`pinterest.de`, `pinterest.co.uk`,
/// `pinterest.com.au`) or any subdomain of those.
static PINTEREST_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9-]+\.)*pinterest\.(?:com|[a-z]{2}|co\.[a-z]{2}|com\.[a-z]{2})$").unwrap()
});

/// TikTok web, mobile and short-link hosts plus Douyin.
static TIKTOK_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9-]+\.)*(?:tiktok\.com|douyin\.com)$").unwrap()
});

static INSTAGRAM_HOST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[a-z0-9-]+\.)*instagram\.com$").unwrap());

/// Post, reel and IGTV paths, optionally behind a username segment.
static INSTAGRAM_POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(?:[^/]+/)?(?:p|reels?|tv)/[^/]+").unwrap());

/// Hosts that are always Pinterest regardless of path.
const PINTEREST_SHORT_HOSTS: &[&str] = &["pin.it"];

/// Legacy Instagram short domain.
const INSTAGRAM_SHORT_HOST: &str = "instagr.am";

/// Classifies post URLs by platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlClassifier;

impl UrlClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Maps a URL string to its platform, or `Unknown` when nothing matches.
    ///
    /// A missing scheme is tolerated (`pin.it/abc`). Matching ignores case.
    pub fn classify(&self, url: &str) -> Platform {
        match normalize(url) {
            Some(parsed) => classify_parsed(&parsed),
            None => Platform::Unknown,
        }
    }
}

/// Shorthand for `UrlClassifier::new().classify(url)`.
pub fn classify(url: &str) -> Platform {
    UrlClassifier::new().classify(url)
}

/// Parses user input into an absolute http(s) URL with a host.
///
/// Prepends `https://` when no scheme is given.
pub fn normalize(input: &str) -> Option<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}")).ok()?
        }
        Err(_) => return None,
    };

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed),
        _ => None,
    }
}

fn classify_parsed(url: &Url) -> Platform {
    // The url crate lowercases domain hosts.
    let Some(host) = url.host_str() else {
        return Platform::Unknown;
    };
    let path = url.path().to_ascii_lowercase();

    if PINTEREST_SHORT_HOSTS.contains(&host) || PINTEREST_HOST.is_match(host) {
        return Platform::Pinterest;
    }
    if TIKTOK_HOST.is_match(host) {
        return Platform::TikTok;
    }
    if INSTAGRAM_HOST.is_match(host) && INSTAGRAM_POST_PATH.is_match(&path) {
        return Platform::Instagram;
    }
    if host == INSTAGRAM_SHORT_HOST && path.starts_with("/p/") {
        return Platform::Instagram;
    }
    Platform::Unknown
}
