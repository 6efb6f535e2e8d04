// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hardened `reqwest::Client` construction for outbound fetches.

use std::sync::Arc;
use std::time::Duration;

use reelgrab_config::model::{FetchConfig, SecurityConfig};
use reelgrab_core::ReelgrabError;
use tracing::{error, warn};

use crate::ssrf::{PrivateAllowlist, SsrfSafeResolver, check_host};

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 10;

/// Build a reqwest::Client with security defaults.
///
/// - Minimum TLS 1.2.
/// - Browser user agent, whole-request and connect timeouts from `fetch`.
/// - Optional proxy from `fetch.proxy`.
/// - When `security.block_private_networks` is set, an SSRF-safe DNS
///   resolver plus a redirect policy refusing private literal IPs.
pub fn build_client(
    fetch: &FetchConfig,
    security: &SecurityConfig,
) -> Result<reqwest::Client, ReelgrabError> {
    let mut builder = reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .user_agent(fetch.user_agent.as_str())
        .timeout(Duration::from_secs(fetch.timeout_secs))
        .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs));

    if let Some(proxy) = fetch.proxy.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
            error!(proxy = %proxy, "invalid proxy URL: {e}");
            ReelgrabError::Config(format!("invalid proxy URL `{proxy}`: {e}"))
        })?;
        builder = builder.proxy(proxy);
    }

    if security.block_private_networks {
        let allowlist = Arc::new(PrivateAllowlist::new(&security.allowed_private_ips));
        builder = builder
            .dns_resolver(Arc::new(SsrfSafeResolver::new(Arc::clone(&allowlist))))
            .redirect(guarded_redirects(allowlist));
    } else {
        warn!("private network blocking disabled for outbound requests");
        builder = builder.redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS));
    }

    builder.build().map_err(|e| {
        error!("failed to build HTTP client: {e}");
        ReelgrabError::Config(format!("failed to build HTTP client: {e}"))
    })
}

/// Redirect policy that re-applies the literal-IP check to every hop.
fn guarded_redirects(allowlist: Arc<PrivateAllowlist>) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error(format!("more than {MAX_REDIRECTS} redirects"));
        }
        match check_host(attempt.url(), &allowlist) {
            Ok(()) => attempt.follow(),
            Err(e) => attempt.error(e.to_string()),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        assert!(build_client(&FetchConfig::default(), &SecurityConfig::default()).is_ok());
    }

    #[test]
    fn builds_without_private_blocking() {
        let security = SecurityConfig {
            block_private_networks: false,
            allowed_private_ips: vec![],
        };
        assert!(build_client(&FetchConfig::default(), &security).is_ok());
    }

    #[test]
    fn builds_with_proxy() {
        let fetch = FetchConfig {
            proxy: Some("http://127.0.0.1:8118".to_string()),
            ..FetchConfig::default()
        };
        assert!(build_client(&fetch, &SecurityConfig::default()).is_ok());
    }

    #[test]
    fn rejects_malformed_proxy() {
        let fetch = FetchConfig {
            proxy: Some("::not a proxy::".to_string()),
            ..FetchConfig::default()
        };
        let err = build_client(&fetch, &SecurityConfig::default()).unwrap_err();
        assert!(matches!(err, ReelgrabError::Config(_)));
    }
}
