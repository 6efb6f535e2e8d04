// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution engine for reelgrab.
//!
//! A [`ResolutionEngine`] classifies a post URL, runs the generic resolver,
//! falls back to the platform's own [`PlatformResolver`] and scrapes the
//! caption alongside. Resolution never fails: an empty result is the answer
//! for posts that cannot be resolved.

pub mod caption;
pub mod engine;
pub mod page_cache;
pub mod resolver;

pub use caption::{clean_caption, fetch_caption};
pub use engine::{DEFAULT_STRATEGY_TIMEOUT, EngineBuilder, ResolutionEngine, Stage};
pub use page_cache::PageCache;
pub use resolver::{PlatformResolver, Resolution};
