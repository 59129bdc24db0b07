use crate::slot::{RequestSlot, Ticket};
use popcorn_config::SearchConfig;
use popcorn_models::MovieSummary;
use popcorn_sources::{FetchError, MovieSource};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub const MOVIE_NOT_FOUND: &str = "Movie not found";
pub const SEARCH_FAILED: &str = "Something went wrong with fetching movies";

/// What the search panel shows. `is_loading`, `error` and `items` are read
/// as mutually exclusive states: loader, error line, or result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub items: Vec<MovieSummary>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Turns a live query into at most one outstanding search request.
pub struct SearchController {
    source: Arc<dyn MovieSource>,
    slot: Arc<RequestSlot<SearchState>>,
    min_query_len: usize,
    debounce: Duration,
}

impl SearchController {
    pub fn new(source: Arc<dyn MovieSource>, min_query_len: usize, debounce: Duration) -> Self {
        Self {
            source,
            slot: Arc::new(RequestSlot::new(SearchState::default())),
            min_query_len,
            debounce,
        }
    }

    pub fn from_config(source: Arc<dyn MovieSource>, config: &SearchConfig) -> Self {
        Self::new(source, config.min_query_len, config.debounce())
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    pub fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    pub fn state(&self) -> SearchState {
        self.slot.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.slot.subscribe()
    }

    /// React to a new query value.
    ///
    /// Short queries reset the results and return `None`. Otherwise the
    /// previous request is cancelled and the new one is spawned; the returned
    /// handle resolves once it has settled (or been cancelled). Dropping the
    /// handle does not cancel the request.
    pub fn set_query(&self, query: &str) -> Option<JoinHandle<()>> {
        if !self.is_searchable(query) {
            let cancelled = self.slot.cancel(|state, cancelled| {
                state.query = query.to_string();
                state.items.clear();
                state.error = None;
                // The cancelled request would have cleared the loader on settle
                if cancelled {
                    state.is_loading = false;
                }
            });
            if cancelled {
                debug!("Search cancelled: query {:?} is below {} chars", query, self.min_query_len);
            }
            return None;
        }

        let ticket = self.slot.begin(|state| {
            state.query = query.to_string();
            state.is_loading = true;
            state.error = None;
        });
        debug!("Search #{} started for {:?}", ticket.generation(), query);

        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let query = query.to_string();
        let debounce = self.debounce;

        Some(tokio::spawn(async move {
            let outcome = run_cancellable(&ticket, debounce, source.search(&query)).await;
            apply_outcome(&slot, &ticket, &query, outcome);
        }))
    }

    /// Cancel any in-flight search, keeping the current results.
    pub fn cancel(&self) -> bool {
        self.slot.cancel(|state, cancelled| {
            if cancelled {
                state.is_loading = false;
            }
        })
    }
}

/// Wait out the debounce, then the request; whichever is pending when the
/// ticket is cancelled gets dropped, which aborts the HTTP request.
pub(crate) async fn run_cancellable<T>(
    ticket: &Ticket,
    debounce: Duration,
    request: impl std::future::Future<Output = Result<T, FetchError>>,
) -> Result<T, FetchError> {
    let work = async {
        if !debounce.is_zero() {
            tokio::time::sleep(debounce).await;
        }
        request.await
    };

    tokio::select! {
        biased;
        _ = ticket.token().cancelled() => Err(FetchError::Cancelled),
        result = work => result,
    }
}

fn apply_outcome(
    slot: &RequestSlot<SearchState>,
    ticket: &Ticket,
    query: &str,
    outcome: Result<Vec<MovieSummary>, FetchError>,
) {
    let applied = match outcome {
        Err(FetchError::Cancelled) => {
            debug!("Search #{} for {:?} superseded", ticket.generation(), query);
            return;
        }
        Ok(items) => {
            debug!("Search #{} for {:?} returned {} items", ticket.generation(), query, items.len());
            slot.settle(ticket, |state| {
                state.items = items;
                state.error = None;
                state.is_loading = false;
            })
        }
        Err(FetchError::NotFound(reason)) => {
            debug!("Search #{} for {:?}: {}", ticket.generation(), query, reason);
            slot.settle(ticket, |state| {
                state.items.clear();
                state.error = Some(MOVIE_NOT_FOUND.to_string());
                state.is_loading = false;
            })
        }
        Err(e) => {
            warn!("Search for {:?} failed: {}", query, e);
            slot.settle(ticket, |state| {
                state.items.clear();
                state.error = Some(SEARCH_FAILED.to_string());
                state.is_loading = false;
            })
        }
    };

    if !applied {
        debug!("Discarded stale result of search #{} for {:?}", ticket.generation(), query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{summary, ScriptedSource};

    fn controller(source: &Arc<ScriptedSource>) -> SearchController {
        SearchController::new(source.clone(), 3, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_short_query_makes_no_request() {
        let source = ScriptedSource::new();
        let search = controller(&source);

        for query in ["", "b", "ba"] {
            assert!(search.set_query(query).is_none());
            let state = search.state();
            assert!(state.items.is_empty());
            assert_eq!(state.error, None);
            assert!(!state.is_loading);
        }
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_min_length_counts_characters() {
        let source = ScriptedSource::new();
        let search = controller(&source);
        // Two characters, four bytes
        assert!(!search.is_searchable("éé"));
        assert!(search.is_searchable("été"));
    }

    #[tokio::test]
    async fn test_search_two_results() {
        let source = ScriptedSource::new();
        let gate = source.gate_search("bat");
        let search = controller(&source);

        let handle = search.set_query("bat").unwrap();
        let loading = search.state();
        assert!(loading.is_loading);
        assert_eq!(loading.error, None);

        gate.send(Ok(vec![summary("tt1", "Batman"), summary("tt2", "Batman Returns")])).unwrap();
        handle.await.unwrap();

        let state = search.state();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.items[1].title, "Batman Returns");
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_not_found_sets_error() {
        let source = ScriptedSource::new();
        let gate = source.gate_search("zzzzzqqqqq");
        let search = controller(&source);

        let handle = search.set_query("zzzzzqqqqq").unwrap();
        gate.send(Err(FetchError::NotFound("Movie not found!".to_string()))).unwrap();
        handle.await.unwrap();

        let state = search.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error.as_deref(), Some(MOVIE_NOT_FOUND));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_failed_search_drops_previous_results() {
        let source = ScriptedSource::new();
        let search = controller(&source);

        let gate = source.gate_search("bat");
        let handle = search.set_query("bat").unwrap();
        gate.send(Ok(vec![summary("tt1", "Batman"), summary("tt2", "Batman Returns")]))
            .unwrap();
        handle.await.unwrap();
        assert_eq!(search.state().items.len(), 2);

        let gate = source.gate_search("zzzzzqqqqq");
        let handle = search.set_query("zzzzzqqqqq").unwrap();
        gate.send(Err(FetchError::NotFound("Movie not found!".to_string()))).unwrap();
        handle.await.unwrap();

        let state = search.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error.as_deref(), Some(MOVIE_NOT_FOUND));
        assert_eq!(state.query, "zzzzzqqqqq");

        search.set_query("bat").unwrap().await.unwrap();
        assert_eq!(search.state().items.len(), 1);
        let gate = source.gate_search("alien");
        let handle = search.set_query("alien").unwrap();
        gate.send(Err(FetchError::EmptyPayload)).unwrap();
        handle.await.unwrap();

        let state = search.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED));
    }

    #[tokio::test]
    async fn test_transport_failure_sets_error() {
        let source = ScriptedSource::new();
        let gate = source.gate_search("alien");
        let search = controller(&source);

        let handle = search.set_query("alien").unwrap();
        let decode_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        gate.send(Err(FetchError::Decode(decode_error))).unwrap();
        handle.await.unwrap();

        let state = search.state();
        assert_eq!(state.error.as_deref(), Some(SEARCH_FAILED));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let source = ScriptedSource::new();
        let slow = source.gate_search("bat");
        let fast = source.gate_search("batman");
        let search = controller(&source);

        let first = search.set_query("bat").unwrap();
        source.wait_for_call("bat").await;

        let second = search.set_query("batman").unwrap();
        fast.send(Ok(vec![summary("tt3", "Batman Begins")])).unwrap();
        second.await.unwrap();
        first.await.unwrap();

        // The first request's transport future was dropped, so its reply has nowhere to go
        assert!(slow.send(Ok(vec![summary("tt1", "Batman")])).is_err());
        assert_eq!(source.aborted(), 1);

        let state = search.state();
        assert_eq!(state.items, vec![summary("tt3", "Batman Begins")]);
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_cancellation_never_surfaces_as_error() {
        let source = ScriptedSource::new();
        let _gate_a = source.gate_search("star");
        let _gate_b = source.gate_search("star w");
        let search = controller(&source);

        let a = search.set_query("star").unwrap();
        source.wait_for_call("star").await;
        let b = search.set_query("star w").unwrap();
        source.wait_for_call("star w").await;
        let c = search.set_query("star wars").unwrap();

        for handle in [a, b, c] {
            handle.await.unwrap();
        }
        let state = search.state();
        assert_eq!(state.error, None);
        assert_eq!(state.items[0].title, "star wars");
        assert_eq!(source.aborted(), 2);
    }

    #[tokio::test]
    async fn test_short_query_mid_flight_resets() {
        let source = ScriptedSource::new();
        let gate = source.gate_search("bat");
        let search = controller(&source);

        let handle = search.set_query("bat").unwrap();
        source.wait_for_call("bat").await;
        assert!(search.set_query("ba").is_none());
        handle.await.unwrap();

        assert!(gate.send(Ok(vec![summary("tt1", "Batman")])).is_err());
        let state = search.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error, None);
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_results_survive_until_replaced() {
        let source = ScriptedSource::new();
        let search = controller(&source);

        search.set_query("heat").unwrap().await.unwrap();
        assert_eq!(search.state().items[0].title, "heat");

        let gate = source.gate_search("heath");
        let handle = search.set_query("heath").unwrap();
        // Still showing the previous results while loading
        assert_eq!(search.state().items[0].title, "heat");
        gate.send(Ok(Vec::new())).unwrap();
        handle.await.unwrap();
        assert!(search.state().items.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_skips_intermediate_queries() {
        let source = ScriptedSource::new();
        let search = SearchController::new(source.clone(), 3, Duration::from_millis(300));

        let first = search.set_query("ali").unwrap();
        let second = search.set_query("alie").unwrap();
        let third = search.set_query("alien").unwrap();
        for handle in [first, second, third] {
            handle.await.unwrap();
        }

        assert_eq!(source.calls(), vec!["alien".to_string()]);
        assert_eq!(search.state().items[0].title, "alien");
    }

    #[tokio::test]
    async fn test_subscribe_sees_settled_state() {
        let source = ScriptedSource::new();
        let search = controller(&source);
        let mut rx = search.subscribe();

        search.set_query("jaws").unwrap().await.unwrap();
        rx.changed().await.unwrap();
        let state = rx.borrow_and_update().clone();
        assert!(!state.is_loading);
        assert_eq!(state.query, "jaws");
    }
}
