// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Strategy with a fixed outcome and a call counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use reelgrab_core::{FetchedMedia, ReelgrabError, ResolveContext, Strategy};

/// What a [`ScriptedStrategy`] does when run.
#[derive(Debug, Clone)]
pub enum Script {
    /// Returns these payloads.
    Media(Vec<FetchedMedia>),
    /// Succeeds with nothing.
    Empty,
    /// Fails with an HTTP error.
    Fail,
}

/// A strategy whose behaviour is fixed up front.
///
/// Clone the counter from [`ScriptedStrategy::counter`] before boxing the
/// strategy into a resolver to assert how often it ran.
pub struct ScriptedStrategy {
    name: String,
    script: Script,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedStrategy {
    pub fn new(name: impl Into<String>, script: Script) -> Self {
        Self {
            name: name.into(),
            script,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A strategy returning one payload fetched from `source_url`.
    pub fn found(name: impl Into<String>, bytes: Vec<u8>, source_url: &str) -> Self {
        Self::new(name, Script::Media(vec![FetchedMedia::new(bytes, source_url)]))
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Script::Empty)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, Script::Fail)
    }

    /// Sleeps before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Strategy for ScriptedStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract(
        &self,
        _ctx: &ResolveContext,
        _post_url: &str,
    ) -> Result<Vec<FetchedMedia>, ReelgrabError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.script {
            Script::Media(media) => Ok(media.clone()),
            Script::Empty => Ok(Vec::new()),
            Script::Fail => Err(ReelgrabError::Http {
                message: format!("{} failed", self.name),
                source: None,
            }),
        }
    }
}
