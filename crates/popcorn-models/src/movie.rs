use serde::{Deserialize, Serialize};

/// One row of a title search.
///
/// `year` is kept as the API sends it; series report ranges such as `2008–2013`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieSummary {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}

/// Full record for a single title, fetched by IMDb id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MovieDetail {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    pub runtime: String, // Free text, e.g. "142 min" or "N/A"
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
    pub imdb_rating: String, // "7.9" or "N/A"
    pub country: String,
    pub awards: String,
    pub media_type: String, // movie, series, episode
}
