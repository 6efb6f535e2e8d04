// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-scoped HTTP sessions.

use std::sync::Arc;

use reelgrab_config::model::{FetchConfig, SecurityConfig};
use reelgrab_core::{Fetcher, ReelgrabError, SessionFactory};
use tracing::trace;

use crate::http::HttpFetcher;

/// Opens a fresh [`HttpFetcher`] (and connection pool) per resolution.
///
/// The pool is released when the last `Arc` of the session drops, which
/// happens when the resolution finishes, fails or is cancelled.
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    fetch: FetchConfig,
    security: SecurityConfig,
}

impl HttpSessionFactory {
    /// Validates the client settings once by building a throwaway client.
    pub fn new(fetch: FetchConfig, security: SecurityConfig) -> Result<Self, ReelgrabError> {
        HttpFetcher::new(&fetch, &security)?;
        Ok(Self { fetch, security })
    }
}

impl SessionFactory for HttpSessionFactory {
    fn open(&self) -> Result<Arc<dyn Fetcher>, ReelgrabError> {
        trace!("opening HTTP session");
        Ok(Arc::new(HttpFetcher::new(&self.fetch, &self.security)?))
    }
}
