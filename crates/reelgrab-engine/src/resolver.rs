// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered strategy cascade for one platform.

use reelgrab_core::{
    FetchedMedia, MIN_MEDIA_BYTES, MediaItem, ResolveContext, Strategy, StrategyOutcome,
};
use reelgrab_fetch::ContentSniffer;
use tracing::debug;

/// Items produced by a resolver and the strategy that produced them.
#[derive(Debug, Default)]
pub struct Resolution {
    pub items: Vec<MediaItem>,
    /// `resolver/strategy`, set when `items` is non-empty.
    pub resolved_by: Option<String>,
}

impl Resolution {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Runs strategies one at a time, in order, and stops at the first that
/// yields usable media.
pub struct PlatformResolver {
    name: String,
    strategies: Vec<Box<dyn Strategy>>,
    sniffer: ContentSniffer,
    min_bytes: usize,
    enabled: bool,
}

impl PlatformResolver {
    pub fn new(name: impl Into<String>, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self {
            name: name.into(),
            strategies,
            sniffer: ContentSniffer::default(),
            min_bytes: MIN_MEDIA_BYTES,
            enabled: true,
        }
    }

    pub fn with_sniffer(mut self, sniffer: ContentSniffer) -> Self {
        self.sniffer = sniffer;
        self
    }

    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// A disabled resolver behaves as one whose strategies all came up empty.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Strategy names in priority order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    fn to_items(&self, media: Vec<FetchedMedia>) -> Vec<MediaItem> {
        media
            .into_iter()
            .filter_map(|m| {
                let kind = self.sniffer.identify_with_hint(&m.bytes, m.hint);
                let size = m.bytes.len();
                let item = MediaItem::new(m.bytes, kind, m.source_url, self.min_bytes);
                if item.is_none() {
                    debug!(resolver = %self.name, size, min = self.min_bytes, "dropping undersized payload");
                }
                item
            })
            .collect()
    }

    /// Walks the cascade. An empty [`Resolution`] means every strategy was
    /// exhausted, which is a normal outcome.
    pub async fn resolve(&self, ctx: &ResolveContext, post_url: &str) -> Resolution {
        if !self.enabled {
            debug!(resolver = %self.name, "resolver disabled");
            return Resolution::default();
        }

        for strategy in &self.strategies {
            let media = match strategy.attempt(ctx, post_url).await {
                StrategyOutcome::Found(media) => media,
                StrategyOutcome::NoResult => continue,
            };
            let items = self.to_items(media);
            if items.is_empty() {
                continue;
            }
            debug!(
                resolver = %self.name,
                strategy = strategy.name(),
                items = items.len(),
                "strategy resolved media"
            );
            return Resolution {
                items,
                resolved_by: Some(format!("{}/{}", self.name, strategy.name())),
            };
        }

        debug!(resolver = %self.name, "all strategies exhausted");
        Resolution::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgrab_core::MediaKind;
    use reelgrab_test_utils::{
        MockFetcher, Script, ScriptedStrategy, context, jpeg_bytes, mp4_bytes, unsigned_bytes,
    };

    const POST: &str = "https://www.pinterest.com/pin/1/";

    #[tokio::test]
    async fn stops_at_first_non_empty_strategy() {
        let a = ScriptedStrategy::empty("a");
        let b = ScriptedStrategy::found("b", jpeg_bytes(1200), "https://cdn/b.jpg");
        let c = ScriptedStrategy::found("c", jpeg_bytes(1200), "https://cdn/c.jpg");
        let (ca, cb, cc) = (a.counter(), b.counter(), c.counter());

        let resolver =
            PlatformResolver::new("pinterest", vec![Box::new(a), Box::new(b), Box::new(c)]);
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;

        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].source_url(), "https://cdn/b.jpg");
        assert_eq!(out.items[0].kind(), MediaKind::Image);
        assert_eq!(out.resolved_by.as_deref(), Some("pinterest/b"));
        assert_eq!(ca.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cb.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cc.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_fall_through_to_next_strategy() {
        let resolver = PlatformResolver::new(
            "tiktok",
            vec![
                Box::new(ScriptedStrategy::failing("boom")),
                Box::new(ScriptedStrategy::found("ok", mp4_bytes(4096), "https://cdn/v.mp4")),
            ],
        );
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;
        assert_eq!(out.items[0].kind(), MediaKind::Video);
        assert_eq!(out.resolved_by.as_deref(), Some("tiktok/ok"));
    }

    #[tokio::test]
    async fn exhaustion_is_empty_not_error() {
        let resolver = PlatformResolver::new(
            "instagram",
            vec![
                Box::new(ScriptedStrategy::empty("a")),
                Box::new(ScriptedStrategy::failing("b")),
            ],
        );
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;
        assert!(out.is_empty());
        assert!(out.resolved_by.is_none());
    }

    #[tokio::test]
    async fn undersized_items_do_not_count_as_found() {
        let tiny = ScriptedStrategy::found("tiny", jpeg_bytes(1023), "https://cdn/t.jpg");
        let real = ScriptedStrategy::found("real", jpeg_bytes(1024), "https://cdn/r.jpg");
        let resolver = PlatformResolver::new("p", vec![Box::new(tiny), Box::new(real)]);
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].len(), 1024);
        assert_eq!(out.resolved_by.as_deref(), Some("p/real"));
    }

    #[tokio::test]
    async fn carousel_items_are_sniffed_individually() {
        let media = vec![
            FetchedMedia::new(jpeg_bytes(2000), "https://cdn/1.jpg"),
            FetchedMedia::new(unsigned_bytes(5000), "https://cdn/2").with_hint(MediaKind::Video),
            FetchedMedia::new(mp4_bytes(3000), "https://cdn/3").with_hint(MediaKind::Image),
        ];
        let resolver = PlatformResolver::new(
            "instagram",
            vec![Box::new(ScriptedStrategy::new("carousel", Script::Media(media)))],
        );
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;
        let kinds: Vec<_> = out.items.iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, vec![MediaKind::Image, MediaKind::Video, MediaKind::Video]);
    }

    #[tokio::test]
    async fn disabled_resolver_runs_nothing() {
        let s = ScriptedStrategy::found("s", jpeg_bytes(2000), "https://cdn/s.jpg");
        let counter = s.counter();
        let resolver = PlatformResolver::new("pinterest", vec![Box::new(s)]).enabled(false);
        let out = resolver.resolve(&context(&MockFetcher::new()), POST).await;
        assert!(out.is_empty());
        assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!resolver.is_enabled());
    }

    #[test]
    fn reports_strategy_order() {
        let resolver = PlatformResolver::new(
            "x",
            vec![
                Box::new(ScriptedStrategy::empty("first")),
                Box::new(ScriptedStrategy::empty("second")),
            ],
        );
        assert_eq!(resolver.strategy_names(), vec!["first", "second"]);
        assert_eq!(resolver.name(), "x");
    }
}
