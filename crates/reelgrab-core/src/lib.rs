// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the reelgrab media resolution engine.
//!
//! This crate provides the data model, the error type and the trait seams
//! (`Fetcher`, `SessionFactory`, `Strategy`) shared by the fetch, extract and
//! engine crates.

pub mod error;
pub mod request;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ReelgrabError;
pub use request::{HttpMethod, HttpRequest, RequestBody};
pub use traits::{Fetcher, ResolveContext, SessionFactory, SharedSession, Strategy};
pub use types::{
    FetchedMedia, MIN_MEDIA_BYTES, MediaItem, MediaKind, MediaResult, Platform, StrategyOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reelgrab_error_variants_construct() {
        let _config = ReelgrabError::Config("test".into());
        let _url = ReelgrabError::InvalidUrl("nope".into());
        let _http = ReelgrabError::Http {
            message: "test".into(),
            source: None,
        };
        let _status = ReelgrabError::Status {
            url: "https://x".into(),
            status: 404,
        };
        let _timeout = ReelgrabError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _small = ReelgrabError::PayloadTooSmall { size: 10, min: 1024 };
        let _large = ReelgrabError::PayloadTooLarge { size: 10, max: 1 };
        let _parse = ReelgrabError::parse("bad", std::io::Error::other("x"));
        let _missing = ReelgrabError::NotFound("no media".into());
        let _security = ReelgrabError::Security("blocked".into());
        let _cancelled = ReelgrabError::Cancelled;
        let _internal = ReelgrabError::Internal("test".into());
    }

    #[test]
    fn transient_classification() {
        assert!(ReelgrabError::Status { url: "u".into(), status: 503 }.is_transient());
        assert!(ReelgrabError::PayloadTooSmall { size: 1, min: 2 }.is_transient());
        assert!(!ReelgrabError::Cancelled.is_transient());
        assert!(!ReelgrabError::Security("x".into()).is_transient());
    }

    #[test]
    fn serde_json_errors_convert_to_parse() {
        let err: ReelgrabError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ReelgrabError::Parse { .. }));
    }

    #[test]
    fn trait_objects_are_constructible() {
        fn _assert_fetcher(_: &dyn Fetcher) {}
        fn _assert_strategy(_: &dyn Strategy) {}
        fn _assert_sessions(_: &dyn SessionFactory) {}
    }
}
