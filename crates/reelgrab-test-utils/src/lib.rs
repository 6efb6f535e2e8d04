// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for reelgrab.
//!
//! Deterministic stand-ins for the network so strategies, resolvers and the
//! engine can be tested without external services.
//!
//! # Components
//!
//! - [`MockFetcher`] - URL-routed canned responses with a request log
//! - [`ScriptedStrategy`] - fixed outcome plus call counter
//! - [`fixtures`] - payloads carrying real magic bytes

pub mod fixtures;
pub mod mock_fetcher;
pub mod scripted_strategy;

use std::sync::Arc;
use std::time::Duration;

use reelgrab_core::{Fetcher, ResolveContext};

pub use fixtures::{jpeg_bytes, mp4_bytes, png_bytes, unsigned_bytes, webm_bytes};
pub use mock_fetcher::{MockFetcher, MockResponse};
pub use scripted_strategy::{Script, ScriptedStrategy};

/// A context over `fetcher` with a generous strategy timeout.
pub fn context(fetcher: &MockFetcher) -> ResolveContext {
    let fetcher: Arc<dyn Fetcher> = Arc::new(fetcher.clone());
    ResolveContext::new(fetcher, Duration::from_secs(30))
}
