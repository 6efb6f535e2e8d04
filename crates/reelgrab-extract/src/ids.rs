// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post identifiers embedded in platform URLs.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static PIN_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/pin/(\d+)").unwrap());

static TIKTOK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:video|photo)/(\d+)").unwrap());

static INSTAGRAM_SHORTCODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?:[^/]+/)?(?:p|reels?|tv)/([A-Za-z0-9_-]+)").unwrap()
});

fn path_of(post_url: &str) -> Option<String> {
    Url::parse(post_url).ok().map(|u| u.path().to_string())
}

/// Numeric pin ID from `/pin/<digits>`. Short `pin.it` links carry none.
pub fn pin_id(post_url: &str) -> Option<String> {
    let path = path_of(post_url)?;
    PIN_ID.captures(&path).map(|c| c[1].to_string())
}

/// Numeric TikTok item ID from `/video/<digits>` or `/photo/<digits>`.
pub fn tiktok_id(post_url: &str) -> Option<String> {
    let path = path_of(post_url)?;
    TIKTOK_ID.captures(&path).map(|c| c[1].to_string())
}

/// Instagram shortcode from `/p/`, `/reel/`, `/reels/` or `/tv/`, with or
/// without a leading username segment.
pub fn instagram_shortcode(post_url: &str) -> Option<String> {
    let path = path_of(post_url)?;
    INSTAGRAM_SHORTCODE
        .captures(&path)
        .map(|c| c[1].to_string())
}
