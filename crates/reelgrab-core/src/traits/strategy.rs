// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strategy trait: one extraction technique for one kind of post.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ReelgrabError;
use crate::traits::fetch::Fetcher;
use crate::types::{FetchedMedia, StrategyOutcome};

/// Request-scoped state handed to every strategy of one resolution.
#[derive(Clone)]
pub struct ResolveContext {
    /// Session opened for this resolution.
    pub fetcher: Arc<dyn Fetcher>,
    /// Upper bound for a single strategy attempt.
    pub strategy_timeout: Duration,
}

impl ResolveContext {
    pub fn new(fetcher: Arc<dyn Fetcher>, strategy_timeout: Duration) -> Self {
        Self {
            fetcher,
            strategy_timeout,
        }
    }
}

/// A self-contained technique for turning a post URL into media payloads.
///
/// Implementors write [`extract`](Strategy::extract) and propagate failures
/// with `?`. Callers use [`attempt`](Strategy::attempt), which never fails:
/// errors, empty output and timeouts all become [`StrategyOutcome::NoResult`].
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Short stable name used in logs and in `MediaResult::resolved_by`.
    fn name(&self) -> &str;

    /// Runs the technique. Single-media strategies return at most one item;
    /// carousel-aware strategies return every validated item together.
    async fn extract(
        &self,
        ctx: &ResolveContext,
        post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError>;

    /// Runs [`extract`](Strategy::extract) under the context's strategy
    /// timeout and folds every failure into `NoResult`.
    async fn attempt(&self, ctx: &ResolveContext, post_url: &str) -> StrategyOutcome {
        match tokio::time::timeout(ctx.strategy_timeout, self.extract(ctx, post_url)).await {
            Ok(Ok(media)) => {
                if media.is_empty() {
                    debug!(strategy = self.name(), "strategy produced no media");
                }
                StrategyOutcome::from_media(media)
            }
            Ok(Err(e)) => {
                debug!(strategy = self.name(), error = %e, "strategy failed");
                StrategyOutcome::NoResult
            }
            Err(_) => {
                debug!(
                    strategy = self.name(),
                    timeout_ms = ctx.strategy_timeout.as_millis() as u64,
                    "strategy timed out"
                );
                StrategyOutcome::NoResult
            }
        }
    }
}
