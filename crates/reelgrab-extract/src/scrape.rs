// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTML and raw-text scraping helpers.
//!
//! [`PageScan`] parses a document once and keeps only owned data, so it can
//! be held across `.await` points (the parsed DOM itself is not `Send`).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").unwrap());
static VIDEO_SRC: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("video[src], video source[src]").unwrap());
static IMG_SRC: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static JSON_LD: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static JSON_SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"script[type="application/json"]"#).unwrap());

static MP4_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https:(?:\\?/){2}[^"'\s<>]+?\.mp4[^"'\s<>]*"#).unwrap());
static MEDIA_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)https:(?:\\?/){2}[^"'\s<>]+?\.(?:jpe?g|png|webp|mp4)[^"'\s<>]*"#).unwrap()
});

/// Everything a strategy may want from one HTML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageScan {
    pub og_image: Option<String>,
    pub og_video: Option<String>,
    pub og_description: Option<String>,
    /// `<video src>` and `<video><source src>` values.
    pub video_sources: Vec<String>,
    /// `<img src>` values.
    pub image_sources: Vec<String>,
    /// `<a href>` values.
    pub links: Vec<String>,
    /// Parsed `application/ld+json` blocks, top-level arrays flattened.
    pub json_ld: Vec<Value>,
    /// Parsed `application/json` script blocks (hydration state).
    pub embedded_json: Vec<Value>,
}

impl PageScan {
    /// Parses `html`. Relative URLs are resolved against `base` when given
    /// and dropped otherwise. Non-http(s) URLs are always dropped.
    pub fn parse(html: &str, base: Option<&Url>) -> Self {
        let document = Html::parse_document(html);
        let absolute = |raw: &str| absolutize(raw, base);

        let mut scan = PageScan::default();
        for tag in document.select(&META) {
            let marker = tag
                .value()
                .attr("property")
                .or_else(|| tag.value().attr("name"))
                .unwrap_or("")
                .to_ascii_lowercase();
            let content = tag.value().attr("content").unwrap_or("");
            match marker.as_str() {
                "og:image" | "og:image:secure_url" | "twitter:image" if scan.og_image.is_none() => {
                    scan.og_image = absolute(content);
                }
                "og:video" | "og:video:secure_url" | "og:video:url" if scan.og_video.is_none() => {
                    scan.og_video = absolute(content);
                }
                "og:description" if scan.og_description.is_none() => {
                    scan.og_description = Some(content.to_string());
                }
                _ => {}
            }
        }

        scan.video_sources = document
            .select(&VIDEO_SRC)
            .filter_map(|e| e.value().attr("src"))
            .filter_map(absolute)
            .collect();
        scan.image_sources = document
            .select(&IMG_SRC)
            .filter_map(|e| e.value().attr("src"))
            .filter_map(absolute)
            .collect();
        scan.links = document
            .select(&ANCHOR)
            .filter_map(|e| e.value().attr("href"))
            .filter_map(absolute)
            .collect();

        for script in document.select(&JSON_LD) {
            let text: String = script.text().collect();
            match serde_json::from_str::<Value>(text.trim()) {
                Ok(Value::Array(items)) => scan.json_ld.extend(items),
                Ok(value) => scan.json_ld.push(value),
                Err(_) => {}
            }
        }
        for script in document.select(&JSON_SCRIPT) {
            let text: String = script.text().collect();
            if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
                scan.embedded_json.push(value);
            }
        }

        scan
    }
}

/// Resolves `raw` against `base`; keeps http(s) URLs only.
pub fn absolutize(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => base?.join(raw).ok()?,
        Err(_) => return None,
    };
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

/// Undoes the escaping found in URLs lifted out of inline scripts.
pub fn unescape_url(raw: &str) -> String {
    raw.replace("\\/", "/")
        .replace("\\u0026", "&")
        .replace("\\u002F", "/")
        .replace("&amp;", "&")
}

/// Direct `.mp4` links anywhere in a text body, unescaped, in order.
pub fn mp4_links(text: &str) -> Vec<String> {
    MP4_LINK
        .find_iter(text)
        .map(|m| unescape_url(m.as_str()))
        .collect()
}

/// Direct image or video file links anywhere in a text body.
pub fn media_links(text: &str) -> Vec<String> {
    MEDIA_LINK
        .find_iter(text)
        .map(|m| unescape_url(m.as_str()))
        .collect()
}

/// Value of the first `"field": "..."` pair in raw text, JSON-unescaped.
pub fn json_string_field(text: &str, field: &str) -> Option<String> {
    let pattern = format!(r#""{}"\s*:\s*("(?:[^"\\]|\\.)*")"#, regex::escape(field));
    let re = Regex::new(&pattern).ok()?;
    let quoted = re.captures(text)?.get(1)?.as_str();
    serde_json::from_str::<String>(quoted).ok()
}

/// JSON object assigned after `marker`, e.g. `window._sharedData = {...};`.
///
/// Parses exactly one value starting at the first `{` after the marker and
/// ignores whatever follows it.
pub fn assigned_json(text: &str, marker: &str) -> Option<Value> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let open = rest.find('{')?;
    serde_json::Deserializer::from_str(&rest[open..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html><head>
<meta property="og:image" content="https://i.pinimg.com/originals/ab/cd/ef.jpg">
<meta property="og:video" content="/videos/clip.mp4">
<meta property="og:description" content="Cats &amp; dogs &#39;together&#39;">
<script type="application/ld+json">[{"@type":"ImageObject","image":"https://i.pinimg.com/ld.jpg"}]</script>
<script type="application/ld+json">{not json</script>
<script id="__STATE__" type="application/json">{"video":{"playAddr":"https://v16/play.mp4"}}</script>
</head><body>
<video src="https://cdn.example/v.mp4"></video>
<video><source src="//cdn.example/alt.webm"></video>
<img src="/static/logo.png"><img src="data:image/png;base64,AAAA">
<a href="https://dl.example/file.mp4?token=1">Download</a>
<a href="javascript:void(0)">nope</a>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://www.example.com/post/1").unwrap()
    }

    #[test]
    fn scans_meta_tags() {
        let scan = PageScan::parse(PAGE, Some(&base()));
        assert_eq!(
            scan.og_image.as_deref(),
            Some("https://i.pinimg.com/originals/ab/cd/ef.jpg")
        );
        assert_eq!(
            scan.og_video.as_deref(),
            Some("https://www.example.com/videos/clip.mp4")
        );
        assert_eq!(scan.og_description.as_deref(), Some("Cats & dogs 'together'"));
    }

    #[test]
    fn scans_media_elements_and_links() {
        let scan = PageScan::parse(PAGE, Some(&base()));
        assert_eq!(
            scan.video_sources,
            vec!["https://cdn.example/v.mp4", "https://cdn.example/alt.webm"]
        );
        assert_eq!(scan.image_sources, vec!["https://www.example.com/static/logo.png"]);
        assert_eq!(scan.links, vec!["https://dl.example/file.mp4?token=1"]);
    }

    #[test]
    fn scans_json_blocks_and_skips_garbage() {
        let scan = PageScan::parse(PAGE, Some(&base()));
        assert_eq!(scan.json_ld.len(), 1);
        assert_eq!(scan.json_ld[0]["image"], "https://i.pinimg.com/ld.jpg");
        assert_eq!(scan.embedded_json.len(), 1);
    }

    #[test]
    fn relative_urls_need_a_base() {
        let scan = PageScan::parse(PAGE, None);
        assert!(scan.og_video.is_none());
        assert_eq!(scan.video_sources, vec!["https://cdn.example/v.mp4"]);
    }

    #[test]
    fn finds_escaped_mp4_links() {
        let text = r#"{"play":"https:\/\/v19.tiktokcdn.com\/x\/video.mp4?a=1&b=2"} https://m.example/y.mp4"#;
        assert_eq!(
            mp4_links(text),
            vec![
                "https://v19.tiktokcdn.com/x/video.mp4?a=1&b=2",
                "https://m.example/y.mp4"
            ]
        );
        assert!(mp4_links("no links here").is_empty());
    }

    #[test]
    fn finds_media_links_case_insensitively() {
        let text = r#"<a href="https://cdn.example/PHOTO.JPG">x</a> https://cdn.example/v.mp4"#;
        assert_eq!(
            media_links(text),
            vec!["https://cdn.example/PHOTO.JPG", "https://cdn.example/v.mp4"]
        );
    }

    #[test]
    fn extracts_escaped_json_field() {
        let text = r#"...,"video_url":"https:\/\/scontent.cdninstagram.com\/v.mp4?x=1&y=2",..."#;
        assert_eq!(
            json_string_field(text, "video_url").as_deref(),
            Some("https://scontent.cdninstagram.com/v.mp4?x=1&y=2")
        );
        assert_eq!(json_string_field(text, "display_url"), None);
    }

    #[test]
    fn parses_assigned_object_ignoring_trailer() {
        let text = r#"<script>window._sharedData = {"a":{"b":"};"}};</script><script>x={}</script>"#;
        let value = assigned_json(text, "window._sharedData").unwrap();
        assert_eq!(value["a"]["b"], "};");
        assert!(assigned_json(text, "window.__missing").is_none());
    }

    #[test]
    fn absolutize_rules() {
        let b = base();
        assert_eq!(
            absolutize("//cdn.x/a.jpg", Some(&b)).as_deref(),
            Some("https://cdn.x/a.jpg")
        );
        assert_eq!(absolutize("ftp://x/a.jpg", Some(&b)), None);
        assert_eq!(absolutize("   ", Some(&b)), None);
    }
}
