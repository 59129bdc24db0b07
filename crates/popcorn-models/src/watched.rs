use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieDetail;

pub const MIN_USER_RATING: u8 = 1;
pub const MAX_USER_RATING: u8 = 10;

/// A title the user has watched and rated.
///
/// Serialized with the field names the watched list has always used on disk
/// (`imdbID`, `userRating`, ...), so existing lists keep loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEntry {
    #[serde(rename = "imdbID")]
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub imdb_rating: Option<f64>,
    pub runtime: Option<u32>, // Minutes
    pub user_rating: u8, // 1-10
    /// How many times the rating was set or changed before the entry was added.
    #[serde(default)]
    pub rating_decisions: u32,
    #[serde(default = "Utc::now")]
    pub date_added: DateTime<Utc>,
}

impl WatchedEntry {
    pub fn from_detail(detail: &MovieDetail, user_rating: u8, rating_decisions: u32) -> Self {
        Self {
            imdb_id: detail.imdb_id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster: detail.poster.clone(),
            imdb_rating: parse_imdb_rating(&detail.imdb_rating),
            runtime: parse_runtime_minutes(&detail.runtime),
            user_rating: user_rating.clamp(MIN_USER_RATING, MAX_USER_RATING),
            rating_decisions,
            date_added: Utc::now(),
        }
    }
}

/// Minutes from the leading token of a runtime string ("142 min" -> 142).
pub fn parse_runtime_minutes(runtime: &str) -> Option<u32> {
    runtime.split_whitespace().next()?.parse().ok()
}

/// "7.9" -> 7.9; "N/A" and anything non-numeric -> None.
pub fn parse_imdb_rating(rating: &str) -> Option<f64> {
    rating.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}
