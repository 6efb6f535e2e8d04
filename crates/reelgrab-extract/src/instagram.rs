// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instagram strategies: embed page, GraphQL query, mirrors and download
//! services.
//!
//! Instagram's CDN refuses media requests without an Instagram referer, so
//! every media fetch here carries [`MEDIA_HEADERS`].

use async_trait::async_trait;
use reelgrab_core::{FetchedMedia, HttpRequest, ReelgrabError, ResolveContext, Strategy};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::candidates::{Candidate, MediaSet, fetch_first};
use crate::ids::instagram_shortcode;
use crate::json::{deep_find_str, str_at};
use crate::scrape::{PageScan, assigned_json, json_string_field, media_links, mp4_links};

pub const INSTAGRAM_BASE: &str = "https://www.instagram.com";

/// Public web app ID sent by instagram.com itself.
const IG_APP_ID: &str = "936619743392459";

pub const MEDIA_HEADERS: [(&str, &str); 2] = [
    ("Referer", "https://www.instagram.com/"),
    ("Origin", "https://www.instagram.com"),
];

fn shortcode(post_url: &str) -> Result<String, ReelgrabError> {
    instagram_shortcode(post_url)
        .ok_or_else(|| ReelgrabError::InvalidUrl(format!("no shortcode in {post_url}")))
}

fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

/// One post node, in either the GraphQL (`is_video`, `video_url`,
/// `display_url`) or the private API (`video_versions`, `image_versions2`)
/// shape.
fn node_candidate(node: &Value) -> Option<Candidate> {
    let is_video = node.get("is_video").and_then(Value::as_bool).unwrap_or(false)
        || node.get("video_versions").is_some();
    if is_video {
        let url = str_at(node, "/video_url").or_else(|| str_at(node, "/video_versions/0/url"));
        if let Some(url) = url {
            return Some(Candidate::video(url));
        }
    }
    str_at(node, "/display_url")
        .or_else(|| str_at(node, "/image_versions2/candidates/0/url"))
        .map(Candidate::image)
}

/// Media of a `shortcode_media` object. Sidecar and `carousel_media` posts
/// become carousels.
pub(crate) fn post_media(media: &Value) -> Option<MediaSet> {
    if let Some(edges) = media
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(Value::as_array)
    {
        let children: Vec<Candidate> = edges
            .iter()
            .filter_map(|edge| edge.get("node"))
            .filter_map(node_candidate)
            .collect();
        if !children.is_empty() {
            return Some(MediaSet::Carousel(children));
        }
    }
    if let Some(items) = media.get("carousel_media").and_then(Value::as_array) {
        let children: Vec<Candidate> = items.iter().filter_map(node_candidate).collect();
        if !children.is_empty() {
            return Some(MediaSet::Carousel(children));
        }
    }
    node_candidate(media).map(|c| MediaSet::Single(vec![c]))
}

/// Scrapes `/p/<code>/embed/captioned/`.
pub struct InstagramEmbedStrategy {
    base: String,
}

impl InstagramEmbedStrategy {
    pub fn new() -> Self {
        Self::with_base(INSTAGRAM_BASE)
    }

    pub fn with_base(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl Default for InstagramEmbedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// Media on an embed page: `window._sharedData` when present, otherwise
/// escaped `video_url`/`display_url` fields, otherwise CDN `<img>` tags.
pub(crate) fn embed_media(html: &str, base: Option<&Url>) -> Option<MediaSet> {
    if let Some(shared) = assigned_json(html, "window._sharedData")
        && let Some(media) = shared.pointer("/entry_data/PostPage/0/graphql/shortcode_media")
        && let Some(set) = post_media(media)
    {
        return Some(set);
    }

    let mut single = Vec::new();
    if let Some(url) = json_string_field(html, "video_url") {
        single.push(Candidate::video(url));
    }
    if let Some(url) = json_string_field(html, "display_url") {
        single.push(Candidate::image(url));
    }
    let scan = PageScan::parse(html, base);
    single.extend(
        scan.image_sources
            .iter()
            .filter(|u| is_instagram_cdn(u))
            .map(|u| Candidate::image(u.as_str())),
    );
    (!single.is_empty()).then_some(MediaSet::Single(single))
}

fn is_instagram_cdn(url: &str) -> bool {
    url.contains("cdninstagram.com") || url.contains("fbcdn.net")
}

#[async_trait]
impl Strategy for InstagramEmbedStrategy {
    fn name(&self) -> &str {
        "instagram-embed"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let code = shortcode(post_url)?;
        let embed_url = format!("{}/p/{code}/embed/captioned/", self.base.trim_end_matches('/'));
        let html = ctx
            .fetcher
            .fetch_text(&HttpRequest::get(embed_url.as_str()).header("Accept", "text/html"))
            .await?;
        let base = Url::parse(&embed_url).ok();
        let media = embed_media(&html, base.as_ref())
            .ok_or_else(|| ReelgrabError::NotFound(format!("no media on embed page for {code}")))?;
        Ok(media.fetch(ctx, &MEDIA_HEADERS).await)
    }
}

/// Queries the public GraphQL endpoint by query hash.
pub struct InstagramGraphqlStrategy {
    base: String,
    query_hash: String,
}

impl InstagramGraphqlStrategy {
    pub fn new(query_hash: impl Into<String>) -> Self {
        Self::with_base(INSTAGRAM_BASE, query_hash)
    }

    pub fn with_base(base: impl Into<String>, query_hash: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            query_hash: query_hash.into(),
        }
    }

    fn query_url(&self, code: &str) -> String {
        let variables = json!({
            "shortcode": code,
            "child_comment_count": 3,
            "fetch_comment_count": 40,
            "parent_comment_count": 24,
            "has_threaded_comments": true
        })
        .to_string();
        format!(
            "{}/graphql/query/?query_hash={}&variables={}",
            self.base.trim_end_matches('/'),
            self.query_hash,
            urlencoding::encode(&variables)
        )
    }
}

/// Media in a GraphQL answer: the `shortcode_media` object when the shape
/// is known, otherwise the first video or display URL anywhere.
pub(crate) fn graphql_media(body: &Value) -> Option<MediaSet> {
    let media = body
        .pointer("/data/shortcode_media")
        .or_else(|| body.pointer("/data/xdt_shortcode_media"))
        .filter(|m| !m.is_null());
    if let Some(set) = media.and_then(post_media) {
        return Some(set);
    }
    let mut single = Vec::new();
    if let Some(url) = deep_find_str(body, "video_url") {
        single.push(Candidate::video(url));
    }
    if let Some(url) = deep_find_str(body, "display_url") {
        single.push(Candidate::image(url));
    }
    (!single.is_empty()).then_some(MediaSet::Single(single))
}

#[async_trait]
impl Strategy for InstagramGraphqlStrategy {
    fn name(&self) -> &str {
        "instagram-graphql"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let code = shortcode(post_url)?;
        let request = HttpRequest::get(self.query_url(&code))
            .header("Accept", "application/json")
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(MEDIA_HEADERS[0].0, MEDIA_HEADERS[0].1);
        let body: Value = serde_json::from_str(&ctx.fetcher.fetch_text(&request).await?)?;
        let media = graphql_media(&body)
            .ok_or_else(|| ReelgrabError::NotFound(format!("no media in GraphQL answer for {code}")))?;
        Ok(media.fetch(ctx, &MEDIA_HEADERS).await)
    }
}

/// Mirror front-ends serving `/p/<code>/`, then download services taking
/// the post URL as `?url=`.
pub struct InstagramMirrorStrategy {
    mirror_hosts: Vec<String>,
    download_services: Vec<String>,
}

impl InstagramMirrorStrategy {
    pub fn new(mirror_hosts: Vec<String>, download_services: Vec<String>) -> Self {
        Self {
            mirror_hosts,
            download_services,
        }
    }
}

/// Candidates on a mirror page: video first, then images.
pub(crate) fn mirror_candidates(html: &str, base: Option<&Url>) -> Vec<Candidate> {
    let scan = PageScan::parse(html, base);
    let mut out: Vec<Candidate> = scan
        .video_sources
        .iter()
        .map(|u| Candidate::video(u.as_str()))
        .collect();
    if let Some(url) = &scan.og_video {
        out.push(Candidate::video(url.as_str()));
    }
    out.extend(mp4_links(html).into_iter().map(Candidate::video));
    if let Some(url) = &scan.og_image {
        out.push(Candidate::image(url.as_str()));
    }
    out.extend(
        scan.image_sources
            .iter()
            .filter(|u| is_instagram_cdn(u))
            .map(|u| Candidate::image(u.as_str())),
    );
    out
}

/// Candidates in a download service answer. Services disagree on shape, so
/// JSON fields are tried first and raw links last.
pub(crate) fn service_candidates(text: &str) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Ok(body) = serde_json::from_str::<Value>(text) {
        for pointer in ["/download_url", "/video_url", "/data/0/url", "/data/0/download_url"] {
            if let Some(url) = str_at(&body, pointer) {
                out.push(Candidate::new(url));
            }
        }
        for key in ["download_url", "video_url"] {
            if let Some(url) = deep_find_str(&body, key) {
                out.push(Candidate::new(url));
            }
        }
    } else {
        for field in ["download_url", "video_url"] {
            if let Some(url) = json_string_field(text, field) {
                out.push(Candidate::new(url));
            }
        }
    }
    out.extend(media_links(text).into_iter().map(Candidate::new));
    out.retain(|c| c.url.starts_with("http"));
    out
}

#[async_trait]
impl Strategy for InstagramMirrorStrategy {
    fn name(&self) -> &str {
        "instagram-mirror"
    }

    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        let code = shortcode(post_url)?;

        for host in &self.mirror_hosts {
            let page_url = format!("{}/p/{code}/", base_url(host));
            match ctx.fetcher.fetch_text(&HttpRequest::get(page_url.as_str())).await {
                Ok(html) => {
                    let base = Url::parse(&page_url).ok();
                    let media =
                        fetch_first(ctx, mirror_candidates(&html, base.as_ref()), &MEDIA_HEADERS)
                            .await;
                    if !media.is_empty() {
                        return Ok(media);
                    }
                }
                Err(e) => debug!(host = %host, error = %e, "mirror unavailable"),
            }
        }

        let encoded = urlencoding::encode(post_url);
        for service in &self.download_services {
            let request = HttpRequest::get(format!("{service}?url={encoded}"));
            match ctx.fetcher.fetch_text(&request).await {
                Ok(text) => {
                    let media = fetch_first(ctx, service_candidates(&text), &MEDIA_HEADERS).await;
                    if !media.is_empty() {
                        return Ok(media);
                    }
                }
                Err(e) => debug!(service = %service, error = %e, "download service unavailable"),
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgrab_core::MediaKind;
    use reelgrab_test_utils::{MockFetcher, MockResponse, context, jpeg_bytes, mp4_bytes};

    const POST: &str = "https://www.instagram.com/p/AbC123/";

    fn urls(set: &MediaSet) -> Vec<&str> {
        set.candidates().iter().map(|c| c.url.as_str()).collect()
    }

    #[test]
    fn single_video_node() {
        let media = json!({"is_video": true, "video_url": "https://cdn/v.mp4", "display_url": "https://cdn/p.jpg"});
        assert_eq!(
            post_media(&media),
            Some(MediaSet::Single(vec![Candidate::video("https://cdn/v.mp4")]))
        );
    }

    #[test]
    fn sidecar_becomes_carousel() {
        let media = json!({"edge_sidecar_to_children": {"edges": [
            {"node": {"is_video": false, "display_url": "https://cdn/1.jpg"}},
            {"node": {"is_video": true, "video_url": "https://cdn/2.mp4", "display_url": "https://cdn/2.jpg"}}
        ]}});
        let set = post_media(&media).unwrap();
        assert!(matches!(set, MediaSet::Carousel(_)));
        assert_eq!(urls(&set), vec!["https://cdn/1.jpg", "https://cdn/2.mp4"]);
        assert_eq!(set.candidates()[1].hint, MediaKind::Video);
    }

    #[test]
    fn private_api_carousel_shape() {
        let media = json!({"carousel_media": [
            {"image_versions2": {"candidates": [{"url": "https://cdn/a.jpg"}]}},
            {"video_versions": [{"url": "https://cdn/b.mp4"}]}
        ]});
        assert_eq!(
            urls(&post_media(&media).unwrap()),
            vec!["https://cdn/a.jpg", "https://cdn/b.mp4"]
        );
    }

    #[test]
    fn embed_prefers_shared_data() {
        let html = r#"<script>window._sharedData = {"entry_data":{"PostPage":[{"graphql":{"shortcode_media":
            {"is_video":false,"display_url":"https://scontent.cdninstagram.com/shared.jpg"}}}]}};</script>
            <script>{"display_url":"https://scontent.cdninstagram.com/other.jpg"}</script>"#;
        assert_eq!(
            urls(&embed_media(html, None).unwrap()),
            vec!["https://scontent.cdninstagram.com/shared.jpg"]
        );
    }

    #[test]
    fn embed_falls_back_to_escaped_fields_and_images() {
        let html = r#"<script>{"video_url":"https:\/\/scontent.cdninstagram.com\/v.mp4?a=1&b=2"}</script>
            <img class="EmbeddedMediaImage" src="https://scontent.cdninstagram.com/poster.jpg">
            <img src="https://static.example/logo.png">"#;
        assert_eq!(
            urls(&embed_media(html, None).unwrap()),
            vec![
                "https://scontent.cdninstagram.com/v.mp4?a=1&b=2",
                "https://scontent.cdninstagram.com/poster.jpg"
            ]
        );
        assert!(embed_media("<html>login</html>", None).is_none());
    }

    #[tokio::test]
    async fn embed_strategy_sends_instagram_headers() {
        let fetcher = MockFetcher::new();
        fetcher
            .on_text(
                "https://ig.test/p/AbC123/embed/captioned/",
                r#"<script>{"display_url":"https:\/\/scontent.cdninstagram.com\/p.jpg"}</script>"#,
            )
            .await;
        fetcher
            .on_bytes("https://scontent.cdninstagram.com/p.jpg", jpeg_bytes(4000))
            .await;
        let ctx = context(&fetcher);

        let media = InstagramEmbedStrategy::with_base("https://ig.test")
            .extract(&ctx, POST)
            .await
            .unwrap();
        assert_eq!(media.len(), 1);
        let calls = fetcher.calls().await;
        assert_eq!(calls[1].header_value("referer"), Some("https://www.instagram.com/"));
        assert_eq!(calls[1].header_value("origin"), Some("https://www.instagram.com"));
    }

    #[test]
    fn graphql_shapes() {
        let known = json!({"data": {"shortcode_media": {"is_video": true, "video_url": "https://cdn/v.mp4"}}});
        assert_eq!(urls(&graphql_media(&known).unwrap()), vec!["https://cdn/v.mp4"]);

        let unknown = json!({"data": {"media": {"items": [{"display_url": "https://cdn/d.jpg"}]}}});
        assert_eq!(urls(&graphql_media(&unknown).unwrap()), vec!["https://cdn/d.jpg"]);

        assert!(graphql_media(&json!({"data": {"shortcode_media": null}})).is_none());
    }

    #[tokio::test]
    async fn graphql_strategy_fetches_sidecar() {
        let fetcher = MockFetcher::new();
        fetcher
            .on_prefix(
                "https://ig.test/graphql/query/?query_hash=h123&variables=",
                MockResponse::Text(
                    json!({"data": {"shortcode_media": {"edge_sidecar_to_children": {"edges": [
                        {"node": {"is_video": false, "display_url": "https://cdn.test/1.jpg"}},
                        {"node": {"is_video": true, "video_url": "https://cdn.test/2.mp4"}}
                    ]}}}})
                    .to_string(),
                ),
            )
            .await;
        fetcher.on_bytes("https://cdn.test/1.jpg", jpeg_bytes(2048)).await;
        fetcher.on_bytes("https://cdn.test/2.mp4", mp4_bytes(8192)).await;
        let ctx = context(&fetcher);

        let media = InstagramGraphqlStrategy::with_base("https://ig.test", "h123")
            .extract(&ctx, POST)
            .await
            .unwrap();
        assert_eq!(media.len(), 2);
        assert_eq!(media[1].hint, MediaKind::Video);
        let calls = fetcher.calls().await;
        assert!(calls[0].url.contains("AbC123"));
        assert_eq!(calls[0].header_value("x-ig-app-id"), Some(IG_APP_ID));
    }

    #[test]
    fn mirror_page_candidates() {
        let html = r#"<meta property="og:image" content="https://mirror.test/thumb.jpg">
            <video src="/media/v.mp4"></video>
            <img src="https://scontent.cdninstagram.com/i.jpg"><img src="/logo.png">"#;
        let base = Url::parse("https://mirror.test/p/AbC123/").unwrap();
        let got: Vec<_> = mirror_candidates(html, Some(&base))
            .into_iter()
            .map(|c| c.url)
            .collect();
        assert_eq!(
            got,
            vec![
                "https://mirror.test/media/v.mp4",
                "https://mirror.test/thumb.jpg",
                "https://scontent.cdninstagram.com/i.jpg"
            ]
        );
    }

    #[test]
    fn service_answer_shapes() {
        let flat = r#"{"download_url":"https://dl.test/a.mp4"}"#;
        assert_eq!(service_candidates(flat)[0].url, "https://dl.test/a.mp4");

        let listed = r#"{"success":true,"data":[{"url":"https://dl.test/b.jpg"}]}"#;
        assert_eq!(service_candidates(listed)[0].url, "https://dl.test/b.jpg");

        let html = r#"<a href="https://dl.test/c.JPEG">get</a>"#;
        assert_eq!(service_candidates(html)[0].url, "https://dl.test/c.JPEG");

        assert!(service_candidates("nothing").is_empty());
    }

    #[tokio::test]
    async fn mirror_strategy_falls_back_to_services() {
        let encoded = urlencoding::encode(POST).into_owned();
        let fetcher = MockFetcher::new();
        fetcher
            .on("https://mirror.test/p/AbC123/", MockResponse::Status(502))
            .await;
        fetcher
            .on_text(
                format!("https://svc.test/api?url={encoded}"),
                r#"{"status":"ok","data":[{"url":"https://dl.test/x.mp4"}]}"#,
            )
            .await;
        fetcher.on_bytes("https://dl.test/x.mp4", mp4_bytes(6000)).await;
        let ctx = context(&fetcher);

        let strategy = InstagramMirrorStrategy::new(
            vec!["mirror.test".into()],
            vec!["https://svc.test/api".into()],
        );
        let media = strategy.extract(&ctx, POST).await.unwrap();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].source_url, "https://dl.test/x.mp4");
    }

    #[tokio::test]
    async fn profile_urls_are_rejected() {
        let ctx = context(&MockFetcher::new());
        let err = InstagramEmbedStrategy::new()
            .extract(&ctx, "https://www.instagram.com/someone/")
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::InvalidUrl(_)));
    }
}
