// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TikTok strategies: mobile feed API, public page, mirror services.

use async_trait::async_trait;
use reelgrab_core::{FetchedMedia, HttpRequest, ReelgrabError, ResolveContext, Strategy};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::candidates::{Candidate, MediaSet, fetch_first};
use crate::ids::tiktok_id;
use crate::json::deep_find_str;
use crate::scrape::{PageScan, mp4_links};

/// User agent of the Android app; the feed API rejects browser agents.
pub const TIKTOK_APP_USER_AGENT: &str = "com.zhiliaoapp.musically/2022600040 \
     (Linux; U; Android 10; en_US; Pixel 4; Build/QQ3A.200805.001; Cronet/58.0.2991.0)";

/// TikTok's CDN serves page-derived URLs only with a TikTok referer.
const REFERER: (&str, &str) = ("Referer", "https://www.tiktok.com/");

fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

fn url_list(value: &Value, pointer: &str) -> Vec<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Media in one feed item: every photo of a photo-mode post as a carousel,
/// or the video play and download addresses in preference order.
pub(crate) fn aweme_media(body: &Value, id: &str) -> Option<MediaSet> {
    let list = body.get("aweme_list")?.as_array()?;
    let item = list
        .iter()
        .find(|a| a.get("aweme_id").and_then(Value::as_str) == Some(id))
        .or_else(|| list.first())?;

    if let Some(images) = item.pointer("/image_post_info/images").and_then(Value::as_array) {
        let photos: Vec<Candidate> = images
            .iter()
            .filter_map(|img| {
                img.pointer("/display_image/url_list/0")
                    .and_then(Value::as_str)
                    .map(Candidate::image)
            })
            .collect();
        if !photos.is_empty() {
            return Some(MediaSet::Carousel(photos));
        }
    }

    let video: Vec<Candidate> = url_list(item, "/video/play_addr/url_list")
        .into_iter()
        .chain(url_list(item, "/video/download_addr/url_list"))
        .map(Candidate::video)
        .collect();
    (!video.is_empty()).then_some(MediaSet::Single(video))
}

/// Calls the mobile feed API on each configured host in turn.
pub struct AwemeApiStrategy {
    hosts: Vec<String>,
}

impl AwemeApiStrategy {
    /// `hosts` are bare API hostnames or base URLs.
    pub fn new(hosts: Vec<String>) -> Self {
        Self { hosts }
    }

    async fn query_host(
        &self,
        ctx: &ResolveContext,
        host: &str,
        id: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let request = HttpRequest::get(format!("{}/aweme/v1/feed/?aweme_id={id}", base_url(host)))
            .header("User-Agent", TIKTOK_APP_USER_AGENT)
            .header("Accept", "application/json");
        let body: Value = serde_json::from_str(&ctx.fetcher.fetch_text(&request).await?)?;
        let media = aweme_media(&body, id)
            .ok_or_else(|| ReelgrabError::NotFound(format!("aweme {id} has no media")))?;
        Ok(media.fetch(ctx, &[]).await)
    }
}

#[async_trait]
impl Strategy for AwemeApiStrategy {
    fn name(&self) -> &str {
        "aweme-api"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let id = tiktok_id(post_url)
            .ok_or_else(|| ReelgrabError::InvalidUrl(format!("no video id in {post_url}")))?;
        for host in &self.hosts {
            match self.query_host(ctx, host, &id).await {
                Ok(media) if !media.is_empty() => return Ok(media),
                Ok(_) => debug!(host = %host, "feed API gave no usable media"),
                Err(e) => debug!(host = %host, error = %e, "feed API failed"),
            }
        }
        Ok(Vec::new())
    }
}

/// Scrapes the public video page.
pub struct TikTokPageStrategy;

/// Candidates from a video page: hydration state, then Open Graph, then
/// `<video>` elements.
pub(crate) fn page_candidates(scan: &PageScan) -> Vec<Candidate> {
    let mut out = Vec::new();
    for state in &scan.embedded_json {
        for key in ["playAddr", "downloadAddr"] {
            if let Some(url) = deep_find_str(state, key).filter(|u| u.starts_with("http")) {
                out.push(Candidate::video(url));
            }
        }
    }
    if let Some(url) = &scan.og_video {
        out.push(Candidate::video(url.as_str()));
    }
    out.extend(scan.video_sources.iter().map(|u| Candidate::video(u.as_str())));
    out
}

#[async_trait]
impl Strategy for TikTokPageStrategy {
    fn name(&self) -> &str {
        "tiktok-page"
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
        Ok(fetch_first(ctx, candidates, &[REFERER]).await)
    }
}

/// Third-party download sites taking the post URL as `?url=`.
pub struct TikTokMirrorStrategy {
    services: Vec<String>,
}

impl TikTokMirrorStrategy {
    pub fn new(services: Vec<String>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Strategy for TikTokMirrorStrategy {
    fn name(&self) -> &str {
        "tiktok-mirror"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let encoded = urlencoding::encode(post_url);
        for service in &self.services {
            let request = HttpRequest::get(format!("{service}?url={encoded}"));
            let text = match ctx.fetcher.fetch_text(&request).await {
                Ok(text) => text,
                Err(e) => {
                    debug!(service = %service, error = %e, "mirror unavailable");
                    continue;
                }
            };
            let candidates: Vec<Candidate> =
                mp4_links(&text).into_iter().map(Candidate::video).collect();
            let media = fetch_first(ctx, candidates, &[]).await;
            if !media.is_empty() {
                return Ok(media);
            }
        }
        Ok(Vec::new())
    }
}
