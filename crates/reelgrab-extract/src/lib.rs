// SPDX-FileCopyrightText: 2026 Reelgrab Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media extraction strategies for reelgrab.
//!
//! Every strategy implements [`reelgrab_core::Strategy`]. The functions at
//! the bottom of this module build each platform's strategies in priority
//! order from configuration.

pub mod candidates;
pub mod generic;
pub mod ids;
pub mod instagram;
pub mod json;
pub mod pinterest;
pub mod scrape;
pub mod tiktok;

use reelgrab_config::model::{GenericConfig, InstagramConfig, PinterestConfig, TikTokConfig};
use reelgrab_core::Strategy;

pub use candidates::{Candidate, MediaSet};
pub use generic::ConversionApiStrategy;
pub use instagram::{InstagramEmbedStrategy, InstagramGraphqlStrategy, InstagramMirrorStrategy};
pub use pinterest::{PinPageStrategy, PinResourceStrategy, PinimgDirectStrategy};
pub use scrape::PageScan;
pub use tiktok::{AwemeApiStrategy, TikTokMirrorStrategy, TikTokPageStrategy};

/// One conversion API strategy per configured endpoint.
pub fn generic_strategies(config: &GenericConfig) -> Vec<Box<dyn Strategy>> {
    config
        .endpoints
        .iter()
        .map(|endpoint| {
            Box::new(ConversionApiStrategy::new(endpoint.as_str(), config.api_key.clone()))
                as Box<dyn Strategy>
        })
        .collect()
}

pub fn pinterest_strategies(_config: &PinterestConfig) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(PinResourceStrategy::new()),
        Box::new(PinPageStrategy),
        Box::new(PinimgDirectStrategy::new()),
    ]
}

pub fn tiktok_strategies(config: &TikTokConfig) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(AwemeApiStrategy::new(config.api_hosts.clone())),
        Box::new(TikTokPageStrategy),
        Box::new(TikTokMirrorStrategy::new(config.mirror_services.clone())),
    ]
}

pub fn instagram_strategies(config: &InstagramConfig) -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(InstagramEmbedStrategy::new()),
        Box::new(InstagramGraphqlStrategy::new(config.graphql_query_hash.as_str())),
        Box::new(InstagramMirrorStrategy::new(
            config.mirror_hosts.clone(),
            config.download_services.clone(),
        )),
    ]
}
