use popcorn_models::{MovieDetail, MovieSummary};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::FetchError;

// OMDb signals "no match" in-band with a 200 and Response = "False"
const RESPONSE_FALSE: &str = "False";

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Option<Vec<OmdbSearchItem>>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year")]
    year: String,
    #[serde(rename = "Poster")]
    poster: String,
    #[serde(rename = "Runtime")]
    runtime: String,
    #[serde(rename = "Plot")]
    plot: String,
    #[serde(rename = "Released")]
    released: String,
    #[serde(rename = "Actors")]
    actors: String,
    #[serde(rename = "Director")]
    director: String,
    #[serde(rename = "Genre")]
    genre: String,
    #[serde(rename = "imdbRating")]
    imdb_rating: String,
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Awards")]
    awards: String,
    #[serde(rename = "Type")]
    media_type: String,
}

/// Decode a `?s=` response body into search rows.
pub fn parse_search_response(body: &str) -> Result<Vec<MovieSummary>, FetchError> {
    let data: OmdbSearchResponse = serde_json::from_str(body)?;

    if data.response == RESPONSE_FALSE {
        return Err(FetchError::NotFound(
            data.error.unwrap_or_else(|| "Movie not found!".to_string()),
        ));
    }

    Ok(data
        .search
        .unwrap_or_default()
        .into_iter()
        .map(|item| MovieSummary {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: item.poster,
        })
        .collect())
}

/// Decode a `?i=` response body. `requested_id` fills in a missing `imdbID`.
pub fn parse_detail_response(body: &str, requested_id: &str) -> Result<MovieDetail, FetchError> {
    let data: OmdbDetailResponse = serde_json::from_str(body)?;

    if data.response == RESPONSE_FALSE {
        return Err(FetchError::NotFound(
            data.error.unwrap_or_else(|| "Incorrect IMDb ID.".to_string()),
        ));
    }
    if data.title.trim().is_empty() {
        return Err(FetchError::EmptyPayload);
    }

    let imdb_id = if data.imdb_id.is_empty() {
        requested_id.to_string()
    } else {
        data.imdb_id
    };

    Ok(MovieDetail {
        imdb_id,
        title: data.title,
        year: data.year,
        poster: data.poster,
        runtime: data.runtime,
        plot: data.plot,
        released: data.released,
        actors: data.actors,
        director: data.director,
        genre: data.genre,
        imdb_rating: data.imdb_rating,
        country: data.country,
        awards: data.awards,
        media_type: data.media_type,
    })
}

async fn get_body(
    client: &Client,
    base_url: &str,
    api_key: &str,
    param: (&str, &str),
) -> Result<String, FetchError> {
    let response = client
        .get(base_url)
        .query(&[("apikey", api_key), param])
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        debug!("OMDb returned {} for {}={}", status, param.0, param.1);
        return Err(FetchError::Status(status));
    }

    Ok(response.text().await?)
}

pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<MovieSummary>, FetchError> {
    let body = get_body(client, base_url, api_key, ("s", query)).await?;
    parse_search_response(&body)
}

pub async fn details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetail, FetchError> {
    let body = get_body(client, base_url, api_key, ("i", imdb_id)).await?;
    parse_detail_response(&body, imdb_id)
}
