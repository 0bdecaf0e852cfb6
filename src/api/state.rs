use crate::config::Config;
use crate::engine::{FeatureBuilder, Predictor};
use crate::feed::nba_stats::NbaStatsClient;
use crate::feed::{CachedFeed, ResponseCache, StatsFeed};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Cached provider feed used by every route
    pub feed: Arc<dyn StatsFeed>,
    /// Response cache behind `feed`, kept for stats reporting
    pub cache: Arc<ResponseCache>,
    pub features: Arc<FeatureBuilder>,
    pub predictor: Arc<Predictor>,
    pub season: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wire state around any raw feed. The feed is wrapped in a fresh
    /// response cache; the predictor starts untrained.
    pub fn with_feed<F>(raw: F, expiry: Duration, predictor: Predictor, season: String) -> Self
    where
        F: StatsFeed + 'static,
    {
        let cache = Arc::new(ResponseCache::new(expiry));
        let feed: Arc<dyn StatsFeed> = Arc::new(CachedFeed::new(raw, cache.clone()));
        Self {
            features: Arc::new(FeatureBuilder::new(feed.clone(), season.clone())),
            feed,
            cache,
            predictor: Arc::new(predictor),
            season,
            started_at: Utc::now(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = NbaStatsClient::new(&config.stats_api)
            .context("failed to build stats.nba.com client")?;
        Ok(Self::with_feed(
            client,
            Duration::from_secs(config.cache.expiry_secs),
            Predictor::new(config.predictor.clone()),
            config.stats_api.season(),
        ))
    }
}
