// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/reelgrab/reelgrab.toml`, then
//! `~/.config/reelgrab/reelgrab.toml`, then `./reelgrab.toml`, then
//! `REELGRAB_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReelgrabConfig;

/// Config sections addressable through `REELGRAB_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "logging",
    "fetch",
    "sniff",
    "strategy",
    "generic",
    "pinterest",
    "tiktok",
    "instagram",
    "caption",
    "security",
];

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/reelgrab/reelgrab.toml`
/// 3. `~/.config/reelgrab/reelgrab.toml`
/// 4. `./reelgrab.toml`
/// 5. `REELGRAB_*` environment variables
pub fn load_config() -> Result<ReelgrabConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string on top of the defaults only.
pub fn load_config_from_str(toml_content: &str) -> Result<ReelgrabConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelgrabConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ReelgrabConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReelgrabConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ReelgrabConfig::default()))
        .merge(Toml::file("/etc/reelgrab/reelgrab.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("reelgrab/reelgrab.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("reelgrab.toml"))
        .merge(env_provider())
}

/// Env provider mapping the first `_` after a known section name to a dot.
///
/// `REELGRAB_FETCH_MIN_BYTES` becomes `fetch.min_bytes`, never
/// `fetch.min.bytes`.
fn env_provider() -> Env {
    Env::prefixed("REELGRAB_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
