// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the reelgrab resolution engine.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across fetchers, strategies and the engine.
///
/// Most variants never reach the engine's caller: strategies swallow them
/// at their boundary and report "no result" instead.
#[derive(Debug, Error)]
pub enum ReelgrabError {
    /// Configuration errors (invalid values, unbuildable HTTP client).
    #[error("configuration error: {0}")]
    Config(String),

    /// The input could not be interpreted as a URL, or lacks a required part.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure (connect, TLS, body read).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// The payload is below the minimum media size floor.
    #[error("payload too small: {size} bytes (min {min})")]
    PayloadTooSmall { size: usize, min: usize },

    /// The payload exceeds the configured ceiling.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u64, max: u64 },

    /// A response could not be decoded into the expected shape.
    #[error("parse error: {message}")]
    Parse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The response was well-formed but carried no usable media reference.
    #[error("not found: {0}")]
    NotFound(String),

    /// A request was refused by the outbound security policy (SSRF).
    #[error("security error: {0}")]
    Security(String),

    /// The caller cancelled the resolution.
    #[error("resolution cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ReelgrabError {
    /// Builds a [`ReelgrabError::Parse`] from any error source.
    pub fn parse<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ReelgrabError::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true for failures a caller may reasonably retry elsewhere
    /// (next candidate, next strategy).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReelgrabError::Http { .. }
                | ReelgrabError::Status { .. }
                | ReelgrabError::Timeout { .. }
                | ReelgrabError::PayloadTooSmall { .. }
        )
    }
}

impl From<serde_json::Error> for ReelgrabError {
    fn from(e: serde_json::Error) -> Self {
        ReelgrabError::parse(format!("invalid JSON: {e}"), e)
    }
}
