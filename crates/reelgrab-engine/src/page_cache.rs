// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped text cache shared by the caption scraper and strategies.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reelgrab_core::{Fetcher, HttpMethod, HttpRequest, ReelgrabError};
use tokio::sync::OnceCell;
use tracing::trace;

type PageKey = (String, Vec<(String, String)>);

/// Wraps one resolution's session so a text `GET` is sent at most once.
///
/// Requests are keyed on URL and headers. Concurrent callers for the same
/// key wait on the first fetch; a failed fetch is not cached. Media
/// downloads and requests with a body pass straight through.
pub struct PageCache {
    inner: Arc<dyn Fetcher>,
    pages: Mutex<HashMap<PageKey, Arc<OnceCell<String>>>>,
}

impl PageCache {
    pub fn new(inner: Arc<dyn Fetcher>) -> Self {
        Self {
            inner,
            pages: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: PageKey) -> Arc<OnceCell<String>> {
        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(pages.entry(key).or_default())
    }
}

#[async_trait]
impl Fetcher for PageCache {
    async fn fetch_media(&self, request: &HttpRequest) -> Result<Vec<u8>, ReelgrabError> {
        self.inner.fetch_media(request).await
    }

    async fn fetch_text(&self, request: &HttpRequest) -> Result<String, ReelgrabError> {
        if request.method != HttpMethod::Get || request.body.is_some() {
            return self.inner.fetch_text(request).await;
        }

        let slot = self.slot((request.url.clone(), request.headers.clone()));
        if slot.initialized() {
            trace!(url = %request.url, "page served from cache");
        }
        slot.get_or_try_init(|| self.inner.fetch_text(request))
            .await
            .cloned()
    }
}
