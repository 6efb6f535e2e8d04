// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resolution engine: generic resolver, then the platform's own
//! resolver, with caption scraping alongside.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use reelgrab_config::ReelgrabConfig;
use reelgrab_core::{
    MediaResult, Platform, ReelgrabError, ResolveContext, SessionFactory, Strategy,
};
use reelgrab_extract::{
    generic_strategies, instagram_strategies, pinterest_strategies, tiktok_strategies,
};
use reelgrab_fetch::{ContentSniffer, HttpSessionFactory};
use reelgrab_router::UrlClassifier;
use strum::Display;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::caption::fetch_caption;
use crate::page_cache::PageCache;
use crate::resolver::{PlatformResolver, Resolution};

/// Default bound on a single strategy attempt.
pub const DEFAULT_STRATEGY_TIMEOUT: Duration = Duration::from_secs(20);

/// Progress of one resolution request.
///
/// Every classified request records `Started`, `GenericAttempted`,
/// `CaptionAttempted` and `Done`. `PlatformAttempted` appears only when the
/// generic resolver came up empty and a resolver is registered for the
/// platform. Unknown URLs and failed sessions go straight from `Started` to
/// `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    Started,
    GenericAttempted,
    PlatformAttempted,
    /// Recorded even when captions are disabled; the `debug` event then
    /// carries `skipped = true`.
    CaptionAttempted,
    Done,
}

/// Stages reached by one request, emitted as `debug` events as they happen.
#[derive(Debug, Default)]
struct StageTrace {
    stages: Mutex<Vec<Stage>>,
}

impl StageTrace {
    fn record(&self, stage: Stage) {
        debug!(stage = %stage, "resolution stage");
        self.push(stage);
    }

    fn record_skipped(&self, stage: Stage) {
        debug!(stage = %stage, skipped = true, "resolution stage");
        self.push(stage);
    }

    fn push(&self, stage: Stage) {
        match self.stages.lock() {
            Ok(mut stages) => stages.push(stage),
            Err(poisoned) => poisoned.into_inner().push(stage),
        }
    }

    fn into_stages(self) -> Vec<Stage> {
        self.stages.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

/// Resolves post URLs into downloadable media.
///
/// Concurrent calls share no mutable state; each opens its own session and
/// wraps it in a [`PageCache`], so the caption scraper and page strategies
/// fetch the post page once between them.
pub struct ResolutionEngine {
    sessions: Arc<dyn SessionFactory>,
    classifier: UrlClassifier,
    generic: PlatformResolver,
    platforms: HashMap<Platform, PlatformResolver>,
    captions: bool,
    strategy_timeout: Duration,
}

impl ResolutionEngine {
    pub fn builder(sessions: Arc<dyn SessionFactory>) -> EngineBuilder {
        EngineBuilder::new(sessions)
    }

    /// Wires the full cascade over real HTTP sessions.
    pub fn from_config(config: &ReelgrabConfig) -> Result<Self, ReelgrabError> {
        let sessions =
            HttpSessionFactory::new(config.fetch.clone(), config.security.clone())?;
        let sniffer = ContentSniffer::new(config.sniff.video_size_threshold);
        let min_bytes = config.fetch.min_bytes;
        let resolver = |name: &str, strategies: Vec<Box<dyn Strategy>>, enabled: bool| {
            PlatformResolver::new(name, strategies)
                .with_sniffer(sniffer)
                .with_min_bytes(min_bytes)
                .enabled(enabled)
        };

        Ok(Self::builder(Arc::new(sessions))
            .generic(resolver(
                "generic",
                generic_strategies(&config.generic),
                config.generic.enabled,
            ))
            .platform(
                Platform::Pinterest,
                resolver(
                    "pinterest",
                    pinterest_strategies(&config.pinterest),
                    config.pinterest.enabled,
                ),
            )
            .platform(
                Platform::TikTok,
                resolver("tiktok", tiktok_strategies(&config.tiktok), config.tiktok.enabled),
            )
            .platform(
                Platform::Instagram,
                resolver(
                    "instagram",
                    instagram_strategies(&config.instagram),
                    config.instagram.enabled,
                ),
            )
            .captions(config.caption.enabled)
            .strategy_timeout(Duration::from_secs(config.strategy.timeout_secs))
            .build())
    }

    pub fn classifier(&self) -> &UrlClassifier {
        &self.classifier
    }

    /// Resolves `post_url`. Never fails: an empty `items` list is the
    /// "could not resolve" answer.
    pub async fn resolve(&self, post_url: &str) -> MediaResult {
        self.resolve_traced(post_url).await.0
    }

    /// Like [`resolve`](Self::resolve), but gives up as soon as `cancel`
    /// fires, dropping the in-flight strategy and its session.
    pub async fn resolve_cancellable(
        &self,
        post_url: &str,
        cancel: CancellationToken,
    ) -> Result<MediaResult, ReelgrabError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(url = %post_url, "resolution cancelled");
                Err(ReelgrabError::Cancelled)
            }
            result = self.resolve(post_url) => Ok(result),
        }
    }

    /// Resolves and reports the stages the request went through.
    pub async fn resolve_traced(&self, post_url: &str) -> (MediaResult, Vec<Stage>) {
        let trace = StageTrace::default();
        let started = Instant::now();
        trace.record(Stage::Started);

        let platform = self.classifier.classify(post_url);
        info!(url = %post_url, %platform, "resolution started");

        if platform == Platform::Unknown {
            info!(url = %post_url, "unsupported URL, nothing to resolve");
            trace.record(Stage::Done);
            return (MediaResult::empty(platform), trace.into_stages());
        }

        let ctx = match self.sessions.open() {
            Ok(fetcher) => {
                ResolveContext::new(Arc::new(PageCache::new(fetcher)), self.strategy_timeout)
            }
            Err(e) => {
                warn!(url = %post_url, error = %e, "could not open HTTP session");
                trace.record(Stage::Done);
                return (MediaResult::empty(platform), trace.into_stages());
            }
        };

        let (resolution, caption) = tokio::join!(
            self.resolve_items(&ctx, post_url, platform, &trace),
            self.caption(&ctx, post_url),
        );
        if self.captions {
            trace.record(Stage::CaptionAttempted);
        } else {
            trace.record_skipped(Stage::CaptionAttempted);
        }

        let result = MediaResult {
            items: resolution.items,
            caption,
            platform,
            resolved_by: resolution.resolved_by,
        };
        info!(
            url = %post_url,
            items = result.items.len(),
            bytes = result.total_bytes(),
            resolved_by = result.resolved_by.as_deref().unwrap_or("-"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "resolution finished"
        );
        trace.record(Stage::Done);
        (result, trace.into_stages())
    }

    async fn resolve_items(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
        platform: Platform,
        trace: &StageTrace,
    ) -> Resolution {
        let generic = self.generic.resolve(ctx, post_url).await;
        trace.record(Stage::GenericAttempted);
        if !generic.is_empty() {
            return generic;
        }

        match self.platforms.get(&platform) {
            Some(resolver) => {
                let resolution = resolver.resolve(ctx, post_url).await;
                trace.record(Stage::PlatformAttempted);
                resolution
            }
            None => {
                debug!(%platform, "no resolver registered, platform stage skipped");
                Resolution::default()
            }
        }
    }

    async fn caption(&self, ctx: &ResolveContext, post_url: &str) -> Option<String> {
        if !self.captions {
            return None;
        }
        fetch_caption(ctx, post_url).await
    }
}

/// Assembles a [`ResolutionEngine`] from explicit parts.
pub struct EngineBuilder {
    sessions: Arc<dyn SessionFactory>,
    generic: PlatformResolver,
    platforms: HashMap<Platform, PlatformResolver>,
    captions: bool,
    strategy_timeout: Duration,
}

impl EngineBuilder {
    fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            sessions,
            generic: PlatformResolver::new("generic", Vec::new()),
            platforms: HashMap::new(),
            captions: true,
            strategy_timeout: DEFAULT_STRATEGY_TIMEOUT,
        }
    }

    pub fn generic(mut self, resolver: PlatformResolver) -> Self {
        self.generic = resolver;
        self
    }

    /// Registers the resolver for `platform`, replacing any earlier one.
    /// Registrations for [`Platform::Unknown`] are ignored.
    pub fn platform(mut self, platform: Platform, resolver: PlatformResolver) -> Self {
        if platform != Platform::Unknown {
            self.platforms.insert(platform, resolver);
        }
        self
    }

    pub fn captions(mut self, enabled: bool) -> Self {
        self.captions = enabled;
        self
    }

    pub fn strategy_timeout(mut self, timeout: Duration) -> Self {
        self.strategy_timeout = timeout;
        self
    }

    pub fn build(self) -> ResolutionEngine {
        ResolutionEngine {
            sessions: self.sessions,
            classifier: UrlClassifier::new(),
            generic: self.generic,
            platforms: self.platforms,
            captions: self.captions,
            strategy_timeout: self.strategy_timeout,
        }
    }
}
