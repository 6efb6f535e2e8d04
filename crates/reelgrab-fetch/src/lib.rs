// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetch primitive and content sniffer for reelgrab.
//!
//! - [`HttpFetcher`]: single-request fetch with timeout, size floor and
//!   ceiling, over the hardened client from `reelgrab-security`.
//! - [`HttpSessionFactory`]: one fetcher per resolution.
//! - [`ContentSniffer`]: magic-byte image/video classification.

pub mod http;
pub mod session;
pub mod sniff;

pub use http::{HttpFetcher, SizeLimits};
pub use session::HttpSessionFactory;
pub use sniff::{ContentSniffer, DEFAULT_VIDEO_THRESHOLD, Signature, sniff};
