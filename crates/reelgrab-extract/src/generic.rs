// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-platform strategy backed by a cobalt-style conversion API.
//!
//! The service takes `POST {"url": "<post url>"}` and answers with a
//! `status` field:
//!
//! - `redirect`, `tunnel`, `stream`: a single direct `url`
//! - `picker`: a `picker` array of `{type, url}` entries (carousels)
//! - `error`: an `error.code` explaining the refusal

use async_trait::async_trait;
use reelgrab_core::{FetchedMedia, HttpRequest, ReelgrabError, ResolveContext, Strategy};
use serde_json::{Value, json};

use crate::candidates::{Candidate, MediaSet};

/// One conversion API endpoint.
pub struct ConversionApiStrategy {
    name: String,
    endpoint: String,
    api_key: Option<String>,
}

impl ConversionApiStrategy {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        let endpoint = endpoint.into();
        let host = url::Url::parse(&endpoint)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| endpoint.clone());
        Self {
            name: format!("conversion-api@{host}"),
            endpoint,
            api_key,
        }
    }

    fn request(&self, post_url: &str) -> HttpRequest {
        let request = HttpRequest::post_json(self.endpoint.as_str(), json!({ "url": post_url }))
            .header("Accept", "application/json");
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Api-Key {key}")),
            None => request,
        }
    }
}

/// Candidates named by a conversion API response.
fn parse_response(body: &Value) -> Result<MediaSet, ReelgrabError> {
    let status = body
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| ReelgrabError::Parse {
            message: "conversion response has no status".into(),
            source: None,
        })?;

    match status {
        "redirect" | "tunnel" | "stream" => {
            let url = body.get("url").and_then(Value::as_str).ok_or_else(|| {
                ReelgrabError::NotFound(format!("`{status}` response without url"))
            })?;
            Ok(MediaSet::Single(vec![Candidate::new(url)]))
        }
        "picker" => {
            let items: Vec<Candidate> = body
                .get("picker")
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| {
                            let url = entry.get("url").and_then(Value::as_str)?;
                            Some(match entry.get("type").and_then(Value::as_str) {
                                Some("photo") => Candidate::image(url),
                                Some("video") | Some("gif") => Candidate::video(url),
                                _ => Candidate::new(url),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            if items.is_empty() {
                return Err(ReelgrabError::NotFound("empty picker".into()));
            }
            Ok(MediaSet::Carousel(items))
        }
        "error" => {
            let code = body
                .pointer("/error/code")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            Err(ReelgrabError::NotFound(format!("conversion refused: {code}")))
        }
        other => Err(ReelgrabError::Parse {
            message: format!("unexpected conversion status `{other}`"),
            source: None,
        }),
    }
}

#[async_trait]
impl Strategy for ConversionApiStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let text = ctx.fetcher.fetch_text(&self.request(post_url)).await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(parse_response(&body)?.fetch(ctx, &[]).await)
    }
}
