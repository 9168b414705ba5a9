//! Season/episode grid for series.
//!
//! The site only exposes season and episode totals, so the grid is derived
//! from those counts and every episode gets a generic label.

use crate::fields;
use crate::types::EpisodeRef;

pub const DEFAULT_SEASONS: u32 = 1;
pub const DEFAULT_EPISODES: u32 = 10;
pub const MAX_SEASONS: u32 = 10;
pub const MAX_EPISODES_PER_SEASON: u32 = 30;

/// Grid for the given totals, with defaults for missing counts.
pub fn synthesize(external_id: &str, seasons: Option<u32>, episodes: Option<u32>) -> Vec<EpisodeRef> {
    let seasons_raw = seasons.unwrap_or(DEFAULT_SEASONS);
    let total = episodes.unwrap_or(DEFAULT_EPISODES);

    let per_season = if seasons_raw > 1 { total / seasons_raw } else { total };
    let per_season = per_season.clamp(1, MAX_EPISODES_PER_SEASON);
    let season_count = seasons_raw.clamp(1, MAX_SEASONS);

    (1..=season_count)
        .flat_map(|season| (1..=per_season).map(move |ep| EpisodeRef::new(external_id, season, ep)))
        .collect()
}

/// Grid derived from a series payload.
pub fn from_payload(external_id: &str, payload: &str) -> Vec<EpisodeRef> {
    synthesize(
        external_id,
        fields::extract_season_count(payload),
        fields::extract_episode_count(payload),
    )
}

/// One season of ten episodes, used when the series page can't be read.
pub fn fallback(external_id: &str) -> Vec<EpisodeRef> {
    (1..=DEFAULT_EPISODES).map(|ep| EpisodeRef::new(external_id, 1, ep)).collect()
}
