use crate::search::run_cancellable;
use crate::slot::{RequestSlot, Ticket};
use popcorn_models::MovieDetail;
use popcorn_sources::{FetchError, MovieSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const DETAIL_FAILED: &str = "Something went wrong with fetching movie details";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DetailState {
    pub selected_id: Option<String>,
    pub detail: Option<MovieDetail>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Fetches the record for the selected title. Changing the selection cancels
/// the previous fetch; there is no debounce since selection is a discrete event.
pub struct DetailFetch {
    source: Arc<dyn MovieSource>,
    slot: Arc<RequestSlot<DetailState>>,
}

impl DetailFetch {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self {
            source,
            slot: Arc::new(RequestSlot::new(DetailState::default())),
        }
    }

    pub fn state(&self) -> DetailState {
        self.slot.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.slot.subscribe()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.slot.snapshot().selected_id
    }

    /// `None` closes the view and discards the detail.
    pub fn select(&self, imdb_id: Option<&str>) -> Option<JoinHandle<()>> {
        let Some(imdb_id) = imdb_id else {
            self.slot.cancel(|state, _| *state = DetailState::default());
            return None;
        };

        let ticket = self.slot.begin(|state| {
            state.selected_id = Some(imdb_id.to_string());
            state.detail = None;
            state.error = None;
            state.is_loading = true;
        });
        debug!("Detail #{} started for {}", ticket.generation(), imdb_id);

        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let imdb_id = imdb_id.to_string();

        Some(tokio::spawn(async move {
            let outcome = run_cancellable(&ticket, Duration::ZERO, source.details(&imdb_id)).await;
            apply_outcome(&slot, &ticket, &imdb_id, outcome);
        }))
    }

    pub fn close(&self) {
        self.select(None);
    }
}

fn apply_outcome(
    slot: &RequestSlot<DetailState>,
    ticket: &Ticket,
    imdb_id: &str,
    outcome: Result<MovieDetail, FetchError>,
) {
    let applied = match outcome {
        Err(FetchError::Cancelled) => {
            debug!("Detail #{} for {} superseded", ticket.generation(), imdb_id);
            return;
        }
        Ok(detail) => slot.settle(ticket, |state| {
            state.detail = Some(detail);
            state.is_loading = false;
        }),
        Err(e) => {
            warn!("Fetching details for {} failed: {}", imdb_id, e);
            slot.settle(ticket, |state| {
                state.error = Some(DETAIL_FAILED.to_string());
                state.is_loading = false;
            })
        }
    };

    if !applied {
        debug!("Discarded stale details #{} for {}", ticket.generation(), imdb_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detail, ScriptedSource};

    #[tokio::test]
    async fn test_select_fetches_detail() {
        let source = ScriptedSource::new();
        let fetch = DetailFetch::new(source.clone());

        let handle = fetch.select(Some("tt1")).unwrap();
        assert!(fetch.state().is_loading);
        handle.await.unwrap();

        let state = fetch.state();
        assert_eq!(state.selected_id.as_deref(), Some("tt1"));
        assert_eq!(state.detail.unwrap().imdb_id, "tt1");
        assert!(!state.is_loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_second_selection_wins() {
        let source = ScriptedSource::new();
        let gate_one = source.gate_details("tt1");
        let gate_two = source.gate_details("tt2");
        let fetch = DetailFetch::new(source.clone());

        let first = fetch.select(Some("tt1")).unwrap();
        source.wait_for_call("tt1").await;
        let second = fetch.select(Some("tt2")).unwrap();

        gate_two.send(Ok(detail("tt2", "Batman Returns"))).unwrap();
        second.await.unwrap();
        first.await.unwrap();
        assert!(gate_one.send(Ok(detail("tt1", "Batman"))).is_err());

        let state = fetch.state();
        assert_eq!(state.selected_id.as_deref(), Some("tt2"));
        assert_eq!(state.detail.unwrap().title, "Batman Returns");
        assert_eq!(source.aborted(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_surfaced() {
        let source = ScriptedSource::new();
        let gate = source.gate_details("tt404");
        let fetch = DetailFetch::new(source.clone());

        let handle = fetch.select(Some("tt404")).unwrap();
        gate.send(Err(FetchError::EmptyPayload)).unwrap();
        handle.await.unwrap();

        let state = fetch.state();
        assert_eq!(state.detail, None);
        assert_eq!(state.error.as_deref(), Some(DETAIL_FAILED));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_close_discards_and_cancels() {
        let source = ScriptedSource::new();
        let gate = source.gate_details("tt1");
        let fetch = DetailFetch::new(source.clone());

        let handle = fetch.select(Some("tt1")).unwrap();
        source.wait_for_call("tt1").await;
        fetch.close();
        handle.await.unwrap();

        assert!(gate.send(Ok(detail("tt1", "Batman"))).is_err());
        assert_eq!(fetch.state(), DetailState::default());
    }
}
