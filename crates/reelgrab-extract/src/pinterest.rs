// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pinterest strategies, most specific first.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reelgrab_core::{FetchedMedia, HttpRequest, ReelgrabError, ResolveContext, Strategy};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::candidates::{Candidate, fetch_first};
use crate::ids::pin_id;
use crate::json::{deep_find_all, str_at};
use crate::scrape::PageScan;

pub const PINTEREST_BASE: &str = "https://www.pinterest.com";
pub const PINIMG_BASE: &str = "https://i.pinimg.com";

static PINIMG_SIZE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https://i\.pinimg\.com)/\d+x(?:\d+)?/").unwrap());

/// Rewrites a sized `i.pinimg.com` thumbnail URL to its `originals/` form.
pub fn originals_url(url: &str) -> Option<String> {
    PINIMG_SIZE
        .is_match(url)
        .then(|| PINIMG_SIZE.replace(url, "$1/originals/").into_owned())
}

/// Image candidates for a pinimg URL: the original first, then as given.
fn pin_image(url: &str) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(2);
    if let Some(original) = originals_url(url) {
        out.push(Candidate::image(original));
    }
    out.push(Candidate::image(url));
    out
}

fn is_direct_media(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_ascii_lowercase();
    [".jpg", ".jpeg", ".png", ".webp", ".gif", ".mp4"]
        .iter()
        .any(|ext| path.ends_with(ext))
}

/// Emulates the web app's `PinResource` call.
pub struct PinResourceStrategy {
    base: String,
}

impl PinResourceStrategy {
    pub fn new() -> Self {
        Self::with_base(PINTEREST_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    fn resource_url(&self, id: &str) -> String {
        let data = json!({
            "options": { "field_set_key": "unauth_react_pin_detail", "id": id },
            "context": {}
        })
        .to_string();
        format!(
            "{}/resource/PinResource/get/?source_url={}&data={}",
            self.base.trim_end_matches('/'),
            urlencoding::encode(&format!("/pin/{id}/")),
            urlencoding::encode(&data)
        )
    }
}

impl Default for PinResourceStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Media candidates in a `PinResource` payload.
///
/// The original image wins; video pins fall back to the largest progressive
/// rendition; anything else is a deep search for direct file URLs.
pub(crate) fn resource_candidates(body: &Value) -> Vec<Candidate> {
    let Some(data) = body.pointer("/resource_response/data") else {
        return Vec::new();
    };
    if let Some(url) = str_at(data, "/images/orig/url") {
        return vec![Candidate::image(url)];
    }

    let largest = data
        .pointer("/videos/video_list")
        .and_then(Value::as_object)
        .and_then(|list| {
            list.values()
                .filter_map(|v| {
                    let url = v.get("url")?.as_str()?;
                    let width = v.get("width")?.as_u64()?;
                    let area = width.saturating_mul(v.get("height")?.as_u64()?);
                    (!url.contains(".m3u8")).then_some((area, url))
                })
                .max_by_key(|(area, _)| *area)
        });
    if let Some((_, url)) = largest {
        return vec![Candidate::video(url)];
    }

    deep_find_all(data, "url")
        .into_iter()
        .filter(|u| is_direct_media(u))
        .map(Candidate::new)
        .collect()
}

#[async_trait]
impl Strategy for PinResourceStrategy {
    fn name(&self) -> &str {
        "pin-resource"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let id = pin_id(post_url)
            .ok_or_else(|| ReelgrabError::InvalidUrl(format!("no pin id in {post_url}")))?;
        let request = HttpRequest::get(self.resource_url(&id))
            .header("Accept", "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        let body: Value = serde_json::from_str(&ctx.fetcher.fetch_text(&request).await?)?;
        let candidates = resource_candidates(&body);
        debug!(pin = %id, candidates = candidates.len(), "pin resource parsed");
        Ok(fetch_first(ctx, candidates, &[]).await)
    }
}

/// Scrapes the public pin page. `pin.it` short links land here through the
/// fetcher's redirect handling.
pub struct PinPageStrategy;

/// Candidates from a pin page: JSON-LD first, then Open Graph. Video
/// references are tried before images so video pins do not resolve to
/// their poster frame.
pub(crate) fn page_candidates(scan: &PageScan) -> Vec<Candidate> {
    let mut videos = Vec::new();
    let mut images = Vec::new();

    for block in &scan.json_ld {
        match block.get("video") {
            Some(Value::Array(items)) => videos.extend(
                items
                    .iter()
                    .filter_map(|v| v.get("contentUrl")?.as_str())
                    .map(Candidate::video),
            ),
            Some(video) => {
                if let Some(url) = video.get("contentUrl").and_then(Value::as_str) {
                    videos.push(Candidate::video(url));
                }
            }
            None => {}
        }
        match block.get("image") {
            Some(Value::String(url)) => images.extend(pin_image(url)),
            Some(Value::Array(items)) => {
                for item in items {
                    let url = item.as_str().or_else(|| item.get("url")?.as_str());
                    if let Some(url) = url {
                        images.extend(pin_image(url));
                    }
                }
            }
            Some(obj) => {
                if let Some(url) = obj.get("url").and_then(Value::as_str) {
                    images.extend(pin_image(url));
                }
            }
            None => {}
        }
    }

    if let Some(url) = &scan.og_video {
        videos.push(Candidate::video(url.as_str()));
    }
    if let Some(url) = &scan.og_image {
        images.extend(pin_image(url));
    }

    videos.extend(images);
    videos
}

#[async_trait]
impl Strategy for PinPageStrategy {
    fn name(&self) -> &str {
        "pin-page"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let html = ctx
            .fetcher
            .fetch_text(&HttpRequest::get(post_url).header("Accept", "text/html"))
            .await?;
        let base = Url::parse(post_url).ok();
        let candidates = page_candidates(&PageScan::parse(&html, base.as_ref()));
        Ok(fetch_first(ctx, candidates, &[]).await)
    }
}

/// Guesses `i.pinimg.com/originals/<pin id>.jpg`. Rarely right, but costs a
/// single request.
pub struct PinimgDirectStrategy {
    base: String,
}

impl PinimgDirectStrategy {
    pub fn new() -> Self {
        Self::with_base(PINIMG_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for PinimgDirectStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Strategy for PinimgDirectStrategy {
    fn name(&self) -> &str {
        "pinimg-direct"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let id = pin_id(post_url)
            .ok_or_else(|| ReelgrabError::InvalidUrl(format!("no pin id in {post_url}")))?;
        let url = format!("{}/originals/{id}.jpg", self.base.trim_end_matches('/'));
        Ok(fetch_first(ctx, vec![Candidate::image(url)], &[]).await)
    }
}
