// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post URL classification for reelgrab.
//!
//! [`UrlClassifier`] maps a user-supplied URL to the [`Platform`] whose
//! resolver should handle it.
//!
//! [`Platform`]: reelgrab_core::Platform

pub mod classifier;

pub use classifier::{UrlClassifier, classify, normalize};
