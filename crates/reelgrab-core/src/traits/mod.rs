// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async trait seams of the resolution engine.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod fetch;
pub mod strategy;

pub use fetch::{Fetcher, SessionFactory, SharedSession};
pub use strategy::{ResolveContext, Strategy};
