//! Scripted `MovieSource` for controller tests.

use async_trait::async_trait;
use popcorn_models::{MovieDetail, MovieSummary};
use popcorn_sources::{FetchError, MovieSource};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type SearchReply = Result<Vec<MovieSummary>, FetchError>;
pub type DetailReply = Result<MovieDetail, FetchError>;

/// Answers immediately unless a gate was registered for the key, in which
/// case the call waits until the test sends the reply.
#[derive(Default)]
pub struct ScriptedSource {
    pub calls: Mutex<Vec<String>>,
    search_gates: Mutex<HashMap<String, oneshot::Receiver<SearchReply>>>,
    detail_gates: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    /// Requests whose future was dropped before completing.
    pub aborted: Arc<AtomicUsize>,
}

struct AbortGuard {
    aborted: Arc<AtomicUsize>,
    armed: bool,
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if self.armed {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate_search(&self, query: &str) -> oneshot::Sender<SearchReply> {
        let (tx, rx) = oneshot::channel();
        self.search_gates.lock().unwrap().insert(query.to_string(), rx);
        tx
    }

    pub fn gate_details(&self, imdb_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.detail_gates.lock().unwrap().insert(imdb_id.to_string(), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Yield until the source has seen a call for `key`.
    pub async fn wait_for_call(&self, key: &str) {
        for _ in 0..1000 {
            if self.calls().iter().any(|c| c == key) {
                return;
            }
            tokio::task::yield_now().await;
        }
        panic!("source never received a call for {}", key);
    }
}

pub fn summary(imdb_id: &str, title: &str) -> MovieSummary {
    MovieSummary {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "1989".to_string(),
        poster: "N/A".to_string(),
    }
}

pub fn detail(imdb_id: &str, title: &str) -> MovieDetail {
    MovieDetail {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "1989".to_string(),
        poster: "N/A".to_string(),
        runtime: "126 min".to_string(),
        imdb_rating: "7.5".to_string(),
        media_type: "movie".to_string(),
        ..MovieDetail::default()
    }
}

#[async_trait]
impl MovieSource for ScriptedSource {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<MovieSummary>, FetchError> {
        self.calls.lock().unwrap().push(query.to_string());
        let gate = self.search_gates.lock().unwrap().remove(query);
        match gate {
            Some(rx) => {
                let mut guard = AbortGuard { aborted: self.aborted.clone(), armed: true };
                let reply = rx.await.unwrap_or(Err(FetchError::EmptyPayload));
                guard.armed = false;
                reply
            }
            None => Ok(vec![summary(&format!("id-{}", query), query)]),
        }
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetail, FetchError> {
        self.calls.lock().unwrap().push(imdb_id.to_string());
        let gate = self.detail_gates.lock().unwrap().remove(imdb_id);
        match gate {
            Some(rx) => {
                let mut guard = AbortGuard { aborted: self.aborted.clone(), armed: true };
                let reply = rx.await.unwrap_or(Err(FetchError::EmptyPayload));
                guard.armed = false;
                reply
            }
            None => Ok(detail(imdb_id, "Untitled")),
        }
    }
}
