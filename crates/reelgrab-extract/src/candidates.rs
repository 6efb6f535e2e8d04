// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning candidate media URLs into validated payloads.

use reelgrab_core::{FetchedMedia, HttpRequest, MediaKind, ResolveContext};
use tracing::debug;

/// A direct media URL a strategy believes in, with the type the platform
/// declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub hint: MediaKind,
}

impl Candidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hint: MediaKind::Unknown,
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hint: MediaKind::Image,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            hint: MediaKind::Video,
        }
    }
}

/// What a strategy found: alternative URLs for a single item, or every
/// item of a carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSet {
    Single(Vec<Candidate>),
    Carousel(Vec<Candidate>),
}

impl MediaSet {
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            MediaSet::Single(c) | MediaSet::Carousel(c) => c,
        }
    }

    /// Fetches a single item's first working URL, or every carousel item.
    pub async fn fetch(self, ctx: &ResolveContext, headers: &[(&str, &str)]) -> Vec<FetchedMedia> {
        match self {
            MediaSet::Single(candidates) => fetch_first(ctx, candidates, headers).await,
            MediaSet::Carousel(candidates) => fetch_all(ctx, candidates, headers).await,
        }
    }
}

/// Drops repeated URLs, keeping the first occurrence.
pub fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

async fn fetch_one(
    ctx: &ResolveContext,
    candidate: &Candidate,
    headers: &[(&str, &str)],
) -> Option<FetchedMedia> {
    let mut request = HttpRequest::get(candidate.url.as_str());
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    match ctx.fetcher.fetch_media(&request).await {
        Ok(bytes) => Some(FetchedMedia::new(bytes, candidate.url.as_str()).with_hint(candidate.hint)),
        Err(e) => {
            debug!(url = %candidate.url, error = %e, "candidate rejected");
            None
        }
    }
}

/// Fetches candidates in order and stops at the first valid payload.
///
/// Returns at most one item; an empty vector means every candidate failed.
pub async fn fetch_first(
    ctx: &ResolveContext,
    candidates: Vec<Candidate>,
    headers: &[(&str, &str)],
) -> Vec<FetchedMedia> {
    for candidate in dedup(candidates) {
        if let Some(media) = fetch_one(ctx, &candidate, headers).await {
            return vec![media];
        }
    }
    Vec::new()
}

/// Fetches every candidate of a carousel, keeping the ones that validate.
pub async fn fetch_all(
    ctx: &ResolveContext,
    candidates: Vec<Candidate>,
    headers: &[(&str, &str)],
) -> Vec<FetchedMedia> {
    let mut media = Vec::new();
    for candidate in dedup(candidates) {
        if let Some(item) = fetch_one(ctx, &candidate, headers).await {
            media.push(item);
        }
    }
    media
}
