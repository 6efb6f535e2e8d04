// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! URL-routed fake [`Fetcher`] for deterministic strategy tests.
//!
//! Responses are keyed by exact URL, with optional prefix routes for URLs
//! whose query strings are awkward to spell out. Unrouted URLs answer 404.
//! Every request is recorded.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use reelgrab_core::{Fetcher, HttpRequest, MIN_MEDIA_BYTES, ReelgrabError};

/// A canned response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Bytes(Vec<u8>),
    Text(String),
    Status(u16),
    /// Transport failure (connection refused, TLS).
    Fail,
}

/// Fake fetcher serving canned responses.
#[derive(Clone)]
pub struct MockFetcher {
    exact: Arc<Mutex<Vec<(String, MockResponse)>>>,
    prefixes: Arc<Mutex<Vec<(String, MockResponse)>>>,
    calls: Arc<Mutex<Vec<HttpRequest>>>,
    min_bytes: usize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            exact: Arc::new(Mutex::new(Vec::new())),
            prefixes: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            min_bytes: MIN_MEDIA_BYTES,
        }
    }

    /// Overrides the media size floor (default 1024).
    pub fn with_min_bytes(mut self, min_bytes: usize) -> Self {
        self.min_bytes = min_bytes;
        self
    }

    /// Routes an exact URL.
    pub async fn on(&self, url: impl Into<String>, response: MockResponse) -> &Self {
        self.exact.lock().await.push((url.into(), response));
        self
    }

    /// Routes every URL starting with `prefix`. Exact routes win.
    pub async fn on_prefix(&self, prefix: impl Into<String>, response: MockResponse) -> &Self {
        self.prefixes.lock().await.push((prefix.into(), response));
        self
    }

    pub async fn on_bytes(&self, url: impl Into<String>, bytes: Vec<u8>) -> &Self {
        self.on(url, MockResponse::Bytes(bytes)).await
    }

    pub async fn on_text(&self, url: impl Into<String>, text: impl Into<String>) -> &Self {
        self.on(url, MockResponse::Text(text.into())).await
    }

    /// Every request seen so far, in order.
    pub async fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().await.clone()
    }

    /// URLs requested so far, in order.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .map(|r| r.url.clone())
            .collect()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn route(&self, request: &HttpRequest) -> Result<Body, ReelgrabError> {
        self.calls.lock().await.push(request.clone());

        let exact = self
            .exact
            .lock()
            .await
            .iter()
            .find(|(url, _)| *url == request.url)
            .map(|(_, r)| r.clone());
        let routed = match exact {
            Some(response) => Some(response),
            None => self
                .prefixes
                .lock()
                .await
                .iter()
                .find(|(prefix, _)| request.url.starts_with(prefix.as_str()))
                .map(|(_, r)| r.clone()),
        };

        match routed.unwrap_or(MockResponse::Status(404)) {
            MockResponse::Status(status) => Err(ReelgrabError::Status {
                url: request.url.clone(),
                status,
            }),
            MockResponse::Fail => Err(ReelgrabError::Http {
                message: format!("connection refused: {}", request.url),
                source: None,
            }),
            MockResponse::Bytes(bytes) => Ok(Body::Bytes(bytes)),
            MockResponse::Text(text) => Ok(Body::Text(text)),
        }
    }
}

/// A successful routed body.
enum Body {
    Bytes(Vec<u8>),
    Text(String),
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch_media(&self, request: &HttpRequest) -> Result<Vec<u8>, ReelgrabError> {
        let bytes = match self.route(request).await? {
            Body::Bytes(bytes) => bytes,
            Body::Text(text) => text.into_bytes(),
        };
        if bytes.len() < self.min_bytes {
            return Err(ReelgrabError::PayloadTooSmall {
                size: bytes.len(),
                min: self.min_bytes,
            });
        }
        Ok(bytes)
    }

    async fn fetch_text(&self, request: &HttpRequest) -> Result<String, ReelgrabError> {
        match self.route(request).await? {
            Body::Text(text) => Ok(text),
            Body::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exact_route_beats_prefix() {
        let fetcher = MockFetcher::new();
        fetcher.on_prefix("https://a.test/", MockResponse::Status(500)).await;
        fetcher.on_text("https://a.test/page", "hello").await;

        let text = fetcher
            .fetch_text(&HttpRequest::get("https://a.test/page"))
            .await
            .unwrap();
        assert_eq!(text, "hello");
        let err = fetcher
            .fetch_text(&HttpRequest::get("https://a.test/other"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn unrouted_urls_are_404_and_logged() {
        let fetcher = MockFetcher::new();
        let err = fetcher
            .fetch_media(&HttpRequest::get("https://nowhere.test/x.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReelgrabError::Status { status: 404, .. }));
        assert_eq!(fetcher.requested_urls().await, vec!["https://nowhere.test/x.jpg"]);
    }

    #[tokio::test]
    async fn media_floor_is_inclusive() {
        let fetcher = MockFetcher::new();
        fetcher.on_bytes("https://a.test/1023", vec![1; 1023]).await;
        fetcher.on_bytes("https://a.test/1024", vec![1; 1024]).await;

        assert!(
            fetcher
                .fetch_media(&HttpRequest::get("https://a.test/1023"))
                .await
                .is_err()
        );
        assert_eq!(
            fetcher
                .fetch_media(&HttpRequest::get("https://a.test/1024"))
                .await
                .unwrap()
                .len(),
            1024
        );
    }
}
