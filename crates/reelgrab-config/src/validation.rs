// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: positive timeouts,
//! a consistent size window, parseable URLs and IP addresses.

use std::net::IpAddr;

use crate::diagnostic::ConfigError;
use crate::model::ReelgrabConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every violation instead of stopping at the first one.
pub fn validate_config(config: &ReelgrabConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.logging.level
        )));
    }

    let fetch = &config.fetch;
    if fetch.timeout_secs == 0 {
        errors.push(ConfigError::validation("fetch.timeout_secs must be greater than 0"));
    }
    if fetch.connect_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "fetch.connect_timeout_secs must be greater than 0",
        ));
    }
    if fetch.min_bytes == 0 {
        errors.push(ConfigError::validation("fetch.min_bytes must be greater than 0"));
    }
    if fetch.min_bytes as u64 > fetch.max_bytes {
        errors.push(ConfigError::validation(format!(
            "fetch.min_bytes ({}) must not exceed fetch.max_bytes ({})",
            fetch.min_bytes, fetch.max_bytes
        )));
    }
    if fetch.user_agent.trim().is_empty() {
        errors.push(ConfigError::validation("fetch.user_agent must not be empty"));
    }
    if let Some(proxy) = &fetch.proxy
        && url::Url::parse(proxy).is_err()
    {
        errors.push(ConfigError::validation(format!(
            "fetch.proxy `{proxy}` is not a valid URL"
        )));
    }

    if config.sniff.video_size_threshold == 0 {
        errors.push(ConfigError::validation(
            "sniff.video_size_threshold must be greater than 0",
        ));
    }
    if config.strategy.timeout_secs == 0 {
        errors.push(ConfigError::validation("strategy.timeout_secs must be greater than 0"));
    }

    for (i, endpoint) in config.generic.endpoints.iter().enumerate() {
        if !is_http_url(endpoint) {
            errors.push(ConfigError::validation(format!(
                "generic.endpoints[{i}] `{endpoint}` must be an http(s) URL"
            )));
        }
    }

    check_non_empty(&mut errors, "tiktok.api_hosts", &config.tiktok.api_hosts);
    check_urls(
        &mut errors,
        "tiktok.mirror_services",
        &config.tiktok.mirror_services,
    );
    if config.instagram.graphql_query_hash.trim().is_empty() {
        errors.push(ConfigError::validation(
            "instagram.graphql_query_hash must not be empty",
        ));
    }
    check_non_empty(
        &mut errors,
        "instagram.mirror_hosts",
        &config.instagram.mirror_hosts,
    );
    check_urls(
        &mut errors,
        "instagram.download_services",
        &config.instagram.download_services,
    );

    for ip in &config.security.allowed_private_ips {
        if ip.parse::<IpAddr>().is_err() {
            errors.push(ConfigError::validation(format!(
                "security.allowed_private_ips entry `{ip}` is not a valid IP address"
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn check_non_empty(errors: &mut Vec<ConfigError>, key: &str, values: &[String]) {
    for (i, value) in values.iter().enumerate() {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key}[{i}] must not be empty")));
        }
    }
}

fn check_urls(errors: &mut Vec<ConfigError>, key: &str, values: &[String]) {
    for (i, value) in values.iter().enumerate() {
        if !is_http_url(value) {
            errors.push(ConfigError::validation(format!(
                "{key}[{i}] `{value}` must be an http(s) URL"
            )));
        }
    }
}
