// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort caption scraping from a post's `og:description`.

use reelgrab_core::{HttpRequest, ResolveContext};
use reelgrab_extract::PageScan;
use tracing::debug;

/// Trims a raw caption; blank captions become `None`.
pub fn clean_caption(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Fetches the post page and returns its decoded `og:description`.
///
/// Never fails: a missing page, missing tag or timeout all yield `None`.
pub async fn fetch_caption(ctx: &ResolveContext, post_url: &str) -> Option<String> {
    let request = HttpRequest::get(post_url)
        .header("Accept", "text/html")
        .timeout(ctx.strategy_timeout);
    let html = match ctx.fetcher.fetch_text(&request).await {
        Ok(html) => html,
        Err(e) => {
            debug!(url = %post_url, error = %e, "caption page unavailable");
            return None;
        }
    };
    clean_caption(PageScan::parse(&html, None).og_description)
}
