pub mod movie;
pub mod summary;
pub mod watched;

pub use movie::{MovieDetail, MovieSummary};
pub use summary::WatchlistSummary;
pub use watched::{parse_imdb_rating, parse_runtime_minutes, WatchedEntry, MAX_USER_RATING, MIN_USER_RATING};
