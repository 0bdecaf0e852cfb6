pub mod cache;
pub mod nba_stats;
pub mod table;

use crate::error::StatsError;
use async_trait::async_trait;
use serde_json::Value;

pub use cache::{CachedFeed, ResponseCache};
pub use table::{StatRow, StatTable};

/// Query string pairs in the order the caller built them.
pub type QueryParams = Vec<(String, String)>;

/// Build owned query params from borrowed pairs.
pub fn query(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Source of raw provider responses.
#[async_trait]
pub trait StatsFeed: Send + Sync {
    /// Full URL an endpoint resolves to. Used as the cache key prefix.
    fn endpoint_url(&self, endpoint: &str) -> String;

    async fn fetch(&self, endpoint: &str, params: &[(String, String)]) -> Result<Value, StatsError>;
}
