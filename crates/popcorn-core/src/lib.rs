pub mod detail;
pub mod search;
pub mod session;
pub mod slot;
pub mod store;
pub mod summary;
pub mod watched;

#[cfg(test)]
mod test_support;

pub use detail::{DetailFetch, DetailState, DETAIL_FAILED};
pub use search::{SearchController, SearchState, MOVIE_NOT_FOUND, SEARCH_FAILED};
pub use session::{RatingDraft, Session};
pub use slot::{RequestSlot, Ticket};
pub use store::{FileStore, KeyValueStore, ListStore, MemoryStore};
pub use summary::{average, summarize};
pub use watched::{AddOutcome, WatchedList};
