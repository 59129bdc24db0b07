use crate::detail::{DetailFetch, DetailState};
use crate::search::{SearchController, SearchState};
use crate::store::KeyValueStore;
use crate::watched::{AddOutcome, WatchedList};
use anyhow::{bail, Result};
use popcorn_config::Config;
use popcorn_models::{WatchedEntry, WatchlistSummary, MAX_USER_RATING, MIN_USER_RATING};
use popcorn_sources::MovieSource;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Rating picked for the open title but not yet committed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingDraft {
    pub rating: Option<u8>,
    /// Number of times the rating changed while the title was open.
    pub decisions: u32,
}

/// One user's search / detail / watched-list interaction.
pub struct Session {
    search: SearchController,
    detail: DetailFetch,
    watched: WatchedList,
    draft: RatingDraft,
}

impl Session {
    pub fn new(search: SearchController, detail: DetailFetch, watched: WatchedList) -> Self {
        Self {
            search,
            detail,
            watched,
            draft: RatingDraft::default(),
        }
    }

    pub fn from_config(config: &Config, source: Arc<dyn MovieSource>, store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(
            SearchController::from_config(Arc::clone(&source), &config.search),
            DetailFetch::new(source),
            WatchedList::load(store, &config.storage.watched_key),
        )
    }

    pub fn search(&self) -> &SearchController {
        &self.search
    }

    pub fn detail(&self) -> &DetailFetch {
        &self.detail
    }

    pub fn watched(&self) -> &WatchedList {
        &self.watched
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state()
    }

    pub fn draft(&self) -> RatingDraft {
        self.draft
    }

    pub fn summary(&self) -> WatchlistSummary {
        self.watched.summary()
    }

    /// A search that reaches the network also closes the open title.
    pub fn set_query(&mut self, query: &str) -> Option<JoinHandle<()>> {
        if self.search.is_searchable(query) {
            self.close();
        }
        self.search.set_query(query)
    }

    /// Selecting the title that is already open closes it.
    pub fn select(&mut self, imdb_id: &str) -> Option<JoinHandle<()>> {
        if self.detail.selected_id().as_deref() == Some(imdb_id) {
            debug!("Deselecting {}", imdb_id);
            self.close();
            return None;
        }
        self.draft = RatingDraft::default();
        self.detail.select(Some(imdb_id))
    }

    pub fn close(&mut self) {
        self.draft = RatingDraft::default();
        self.detail.close();
    }

    /// Rating the user gave the open title earlier, if it is already watched.
    pub fn selected_watched_rating(&self) -> Option<u8> {
        self.detail
            .selected_id()
            .and_then(|id| self.watched.user_rating(&id))
    }

    pub fn rate(&mut self, rating: u8) -> Result<()> {
        if !(MIN_USER_RATING..=MAX_USER_RATING).contains(&rating) {
            bail!("Rating must be between {} and {}", MIN_USER_RATING, MAX_USER_RATING);
        }
        if self.draft.rating != Some(rating) {
            self.draft.rating = Some(rating);
            self.draft.decisions += 1;
        }
        Ok(())
    }

    /// Commit the open title with the drafted rating, then close it.
    pub fn add_selected(&mut self) -> Result<AddOutcome> {
        let state = self.detail.state();
        let Some(detail) = state.detail else {
            match state.selected_id {
                Some(id) if state.is_loading => bail!("Details for {} are still loading", id),
                Some(id) => bail!("No details available for {}", id),
                None => bail!("No title selected"),
            }
        };
        let Some(rating) = self.draft.rating else {
            bail!("Rate {} before adding it", detail.title);
        };

        let entry = WatchedEntry::from_detail(&detail, rating, self.draft.decisions);
        let outcome = self.watched.add(entry)?;
        if outcome == AddOutcome::Added {
            self.close();
        }
        Ok(outcome)
    }

    pub fn remove_watched(&mut self, imdb_id: &str) -> Result<bool> {
        self.watched.remove(imdb_id)
    }
}
