// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound HTTP seam used by every strategy.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ReelgrabError;
use crate::request::HttpRequest;

/// Retrieves bytes and text over HTTP.
///
/// Implementations enforce their own timeouts and size limits. A non-success
/// status, a timeout, or a body outside the size window is an error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a direct media URL. The returned body is at least the
    /// configured minimum size.
    async fn fetch_media(&self, request: &HttpRequest) -> Result<Vec<u8>, ReelgrabError>;

    /// Fetches a page or API response as text.
    async fn fetch_text(&self, request: &HttpRequest) -> Result<String, ReelgrabError>;
}

/// Opens a request-scoped [`Fetcher`].
///
/// The engine opens one session per resolution and drops it when the
/// resolution ends, on every exit path.
pub trait SessionFactory: Send + Sync {
    fn open(&self) -> Result<Arc<dyn Fetcher>, ReelgrabError>;
}

/// A factory that hands out clones of one shared fetcher.
pub struct SharedSession(pub Arc<dyn Fetcher>);

impl SessionFactory for SharedSession {
    fn open(&self) -> Result<Arc<dyn Fetcher>, ReelgrabError> {
        Ok(Arc::clone(&self.0))
    }
}
