// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for reelgrab.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Desktop Chrome user agent sent with page and media requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Top-level reelgrab configuration.
///
/// Every section is optional and falls back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReelgrabConfig {
    /// Log filter settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Outbound HTTP settings shared by every strategy.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Content sniffer settings.
    #[serde(default)]
    pub sniff: SniffConfig,

    /// Per-strategy limits.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Cross-platform conversion API resolver.
    #[serde(default)]
    pub generic: GenericConfig,

    #[serde(default)]
    pub pinterest: PinterestConfig,

    #[serde(default)]
    pub tiktok: TikTokConfig,

    #[serde(default)]
    pub instagram: InstagramConfig,

    /// Post caption scraping.
    #[serde(default)]
    pub caption: CaptionConfig,

    /// Outbound network policy.
    #[serde(default)]
    pub security: SecurityConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Level for the `reelgrab` targets (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// User agent sent unless a request overrides it.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Smallest accepted media payload in bytes (inclusive).
    #[serde(default = "default_min_bytes")]
    pub min_bytes: usize,

    /// Largest accepted media payload in bytes (inclusive).
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Optional proxy for every outbound request (`http://`, `https://`, `socks5://`).
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_fetch_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            min_bytes: default_min_bytes(),
            max_bytes: default_max_bytes(),
            proxy: None,
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_min_bytes() -> usize {
    1024
}

fn default_max_bytes() -> u64 {
    50 * 1024 * 1024
}

/// Content sniffer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SniffConfig {
    /// Unsigned payloads strictly larger than this are classified as video.
    #[serde(default = "default_video_size_threshold")]
    pub video_size_threshold: usize,
}

impl Default for SniffConfig {
    fn default() -> Self {
        Self {
            video_size_threshold: default_video_size_threshold(),
        }
    }
}

fn default_video_size_threshold() -> usize {
    2 * 1024 * 1024
}

/// Strategy limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyConfig {
    /// Upper bound for one strategy attempt, in seconds.
    #[serde(default = "default_strategy_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_strategy_timeout_secs(),
        }
    }
}

fn default_strategy_timeout_secs() -> u64 {
    20
}

/// Cross-platform conversion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenericConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Conversion API endpoints, tried in order.
    #[serde(default = "default_generic_endpoints")]
    pub endpoints: Vec<String>,

    /// Sent as `Authorization: Api-Key <key>` when set.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GenericConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoints: default_generic_endpoints(),
            api_key: None,
        }
    }
}

fn default_generic_endpoints() -> Vec<String> {
    vec!["https://api.cobalt.tools/".to_string()]
}

/// Pinterest resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PinterestConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PinterestConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// TikTok resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TikTokConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Hosts serving the mobile feed API.
    #[serde(default = "default_tiktok_api_hosts")]
    pub api_hosts: Vec<String>,

    /// Third-party mirror services queried with `?url=<post>`.
    #[serde(default = "default_tiktok_mirror_services")]
    pub mirror_services: Vec<String>,
}

impl Default for TikTokConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_hosts: default_tiktok_api_hosts(),
            mirror_services: default_tiktok_mirror_services(),
        }
    }
}

fn default_tiktok_api_hosts() -> Vec<String> {
    vec![
        "api16-normal-c-useast1a.tiktokv.com".to_string(),
        "api22-normal-c-useast1a.tiktokv.com".to_string(),
    ]
}

fn default_tiktok_mirror_services() -> Vec<String> {
    vec![
        "https://tikmate.online/download".to_string(),
        "https://snaptik.app/abc".to_string(),
        "https://musicaldown.com/download".to_string(),
    ]
}

/// Instagram resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstagramConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Persisted query hash of the public post-detail GraphQL query.
    #[serde(default = "default_graphql_query_hash")]
    pub graphql_query_hash: String,

    /// Front-ends that mirror `/p/<shortcode>` pages.
    #[serde(default = "default_instagram_mirror_hosts")]
    pub mirror_hosts: Vec<String>,

    /// Download services queried with `?url=<post>`.
    #[serde(default = "default_instagram_download_services")]
    pub download_services: Vec<String>,
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            graphql_query_hash: default_graphql_query_hash(),
            mirror_hosts: default_instagram_mirror_hosts(),
            download_services: default_instagram_download_services(),
        }
    }
}

fn default_graphql_query_hash() -> String {
    "9b498c08113f1e09617a1703c22b2f32".to_string()
}

fn default_instagram_mirror_hosts() -> Vec<String> {
    vec!["ddinstagram.com".to_string(), "instagr.am".to_string()]
}

fn default_instagram_download_services() -> Vec<String> {
    vec![
        "https://instasave.website/download".to_string(),
        "https://downloadgram.org/download".to_string(),
        "https://instadownloader.co/api".to_string(),
        "https://saveinsta.app/api".to_string(),
    ]
}

/// Caption scraping configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CaptionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Outbound network policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Refuse to connect to private, loopback and link-local addresses.
    #[serde(default = "default_true")]
    pub block_private_networks: bool,

    /// Private IPs exempt from the block (local test servers, internal proxies).
    #[serde(default)]
    pub allowed_private_ips: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            block_private_networks: true,
            allowed_private_ips: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
