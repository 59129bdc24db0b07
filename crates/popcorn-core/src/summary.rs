use popcorn_models::{WatchedEntry, WatchlistSummary};

/// Arithmetic mean; the mean of nothing is 0.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Entries with an unknown IMDb rating or runtime are left out of that average only.
pub fn summarize(entries: &[WatchedEntry]) -> WatchlistSummary {
    let imdb_ratings: Vec<f64> = entries.iter().filter_map(|e| e.imdb_rating).collect();
    let user_ratings: Vec<f64> = entries.iter().map(|e| f64::from(e.user_rating)).collect();
    let runtimes: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.runtime.map(f64::from))
        .collect();

    WatchlistSummary {
        count: entries.len(),
        avg_imdb_rating: average(&imdb_ratings),
        avg_user_rating: average(&user_ratings),
        avg_runtime_minutes: average(&runtimes),
    }
}
