use crate::error::StatsError;
use crate::feed::nba_stats::{player_index_query, player_profile_query, PLAYER_INDEX, PLAYER_PROFILE};
use crate::feed::{StatRow, StatTable, StatsFeed};

/// Column holding "First Last" in the player index.
pub const NAME_COLUMN: &str = "DISPLAY_FIRST_LAST";
/// Result set in the profile response with one row per regular season.
pub const SEASON_TOTALS: &str = "SeasonTotalsRegularSeason";

/// Active players for `season` whose display name contains `name`,
/// ignoring case.
pub async fn search_players(
    feed: &dyn StatsFeed,
    season: &str,
    name: &str,
) -> Result<Vec<StatRow>, StatsError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StatsError::MissingParam("name"));
    }
    let response = feed.fetch(PLAYER_INDEX, &player_index_query(season)).await?;
    let table = StatTable::from_response(&response)?;
    Ok(table
        .filter_contains(NAME_COLUMN, name)
        .into_iter()
        .cloned()
        .collect())
}

/// Per-season regular-season averages for one player. A player with no
/// seasons on record is `NoData`.
pub async fn player_seasons(feed: &dyn StatsFeed, player_id: u64) -> Result<Vec<StatRow>, StatsError> {
    let response = feed.fetch(PLAYER_PROFILE, &player_profile_query(player_id)).await?;
    let table = StatTable::named(&response, SEASON_TOTALS)?;
    if table.is_empty() {
        return Err(StatsError::NoData(format!("no seasons on record for player {}", player_id)));
    }
    Ok(table.rows)
}
