use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use crate::error::FetchError;

/// A movie database that can be searched by title and queried by id.
///
/// Implementations must be cancel-safe: dropping a returned future aborts the
/// underlying request and leaves no side effects behind.
#[async_trait]
pub trait MovieSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Title search. An empty match set is reported as `FetchError::NotFound`.
    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, FetchError>;

    async fn details(&self, imdb_id: &str) -> Result<MovieDetail, FetchError>;
}
