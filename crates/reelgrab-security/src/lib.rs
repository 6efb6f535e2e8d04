// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound network security for reelgrab.
//!
//! Provides SSRF prevention (DNS filtering, literal-IP URL checks, guarded
//! redirects) and the hardened HTTP client every fetch goes through.

pub mod client;
pub mod ssrf;

pub use client::build_client;
pub use ssrf::{PrivateAllowlist, SsrfSafeResolver, is_private_ip, validate_url_host};
