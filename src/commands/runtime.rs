use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::commands::base_commands::FeedArgs;
use crate::services::dashboard_config::{ConfigError, DashboardConfig};
use crate::services::feed_client::{FeedError, HttpFeedClient};
use crate::services::fetch_cache::{CachedSnapshotSource, SystemClock};

pub type LiveSource = CachedSnapshotSource<HttpFeedClient, SystemClock>;

pub fn load_config(feed: &FeedArgs) -> Result<DashboardConfig, ConfigError> {
    let mut config = DashboardConfig::load(feed.config.as_deref())?;
    if let Some(url) = &feed.url {
        config.feed_url = url.clone();
        config.validate()?;
    }
    Ok(config)
}

pub fn build_source(config: &DashboardConfig) -> Result<LiveSource, FeedError> {
    let client = HttpFeedClient::new(&config.feed_url, config.timeout())?;
    let key = client.url().to_string();
    Ok(CachedSnapshotSource::new(
        client,
        &key,
        config.cache_ttl(),
        SystemClock,
    ))
}

pub fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
