use crate::store::{KeyValueStore, ListStore};
use crate::summary::summarize;
use anyhow::Result;
use popcorn_models::{WatchedEntry, WatchlistSummary};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The id is already on the list; nothing was written.
    AlreadyWatched,
}

/// The user's watched titles, in the order they were added.
///
/// Loaded once on construction and saved after every change. The collection
/// is rebuilt on each change and only swapped in once the save succeeded, so
/// memory and store never disagree.
pub struct WatchedList {
    entries: Vec<WatchedEntry>,
    store: ListStore<WatchedEntry>,
}

impl WatchedList {
    pub fn load(store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        let store = ListStore::new(store, key);
        let entries = store.load();
        Self { entries, store }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, imdb_id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|e| e.imdb_id == imdb_id)
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.get(imdb_id).is_some()
    }

    pub fn user_rating(&self, imdb_id: &str) -> Option<u8> {
        self.get(imdb_id).map(|e| e.user_rating)
    }

    /// Ids are unique: a second entry for the same title is refused.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<AddOutcome> {
        if self.contains(&entry.imdb_id) {
            return Ok(AddOutcome::AlreadyWatched);
        }

        let title = entry.title.clone();
        let mut next = self.entries.clone();
        next.push(entry);
        self.store.save(&next)?;
        self.entries = next;

        info!("Added {} to watched ({} total)", title, self.entries.len());
        Ok(AddOutcome::Added)
    }

    /// Returns whether anything was removed. Unknown ids are a no-op and do not touch the store.
    pub fn remove(&mut self, imdb_id: &str) -> Result<bool> {
        if !self.contains(imdb_id) {
            return Ok(false);
        }

        let next: Vec<WatchedEntry> = self
            .entries
            .iter()
            .filter(|e| e.imdb_id != imdb_id)
            .cloned()
            .collect();
        self.store.save(&next)?;
        self.entries = next;

        info!("Removed {} from watched ({} left)", imdb_id, self.entries.len());
        Ok(true)
    }

    pub fn summary(&self) -> WatchlistSummary {
        summarize(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::test_support::detail;

    fn entry(imdb_id: &str, user_rating: u8) -> WatchedEntry {
        WatchedEntry::from_detail(&detail(imdb_id, "Batman"), user_rating, 1)
    }

    fn stored(store: &MemoryStore) -> Vec<WatchedEntry> {
        let json = store.get("watched").unwrap().unwrap_or_else(|| "[]".to_string());
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_add_then_delete_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut list = WatchedList::load(store.clone(), "watched");
        let before = list.len();

        assert_eq!(list.add(entry("tt1", 8)).unwrap(), AddOutcome::Added);
        assert_eq!(list.len(), before + 1);
        assert_eq!(stored(&store).len(), before + 1);
        assert_eq!(stored(&store)[0].user_rating, 8);

        assert!(list.remove("tt1").unwrap());
        assert_eq!(list.len(), before);
        assert!(stored(&store).is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let store = Arc::new(MemoryStore::new());
        let mut list = WatchedList::load(store.clone(), "watched");
        list.add(entry("tt1", 8)).unwrap();
        let snapshot = list.entries().to_vec();

        assert!(!list.remove("tt999").unwrap());
        assert_eq!(list.entries(), snapshot.as_slice());
        assert_eq!(stored(&store), snapshot);
    }

    #[test]
    fn test_duplicate_id_refused() {
        let store = Arc::new(MemoryStore::new());
        let mut list = WatchedList::load(store, "watched");
        list.add(entry("tt1", 8)).unwrap();

        assert_eq!(list.add(entry("tt1", 3)).unwrap(), AddOutcome::AlreadyWatched);
        assert_eq!(list.len(), 1);
        assert_eq!(list.user_rating("tt1"), Some(8));
    }

    #[test]
    fn test_insertion_order_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()).unwrap());
        let mut list = WatchedList::load(store.clone(), "watched");
        for (id, rating) in [("tt3", 5), ("tt1", 9), ("tt2", 7)] {
            list.add(entry(id, rating)).unwrap();
        }

        let reloaded = WatchedList::load(store, "watched");
        let ids: Vec<&str> = reloaded.entries().iter().map(|e| e.imdb_id.as_str()).collect();
        assert_eq!(ids, vec!["tt3", "tt1", "tt2"]);
        assert_eq!(reloaded.entries(), list.entries());
    }

    /// Reads pass through; every write fails.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, _value: &str) -> Result<()> {
            anyhow::bail!("disk full writing {}", key)
        }

        fn remove(&self, key: &str) -> Result<()> {
            anyhow::bail!("disk full removing {}", key)
        }
    }

    #[test]
    fn test_failed_save_leaves_list_unchanged() {
        let seeded = MemoryStore::new();
        let json = serde_json::to_string(&vec![entry("tt1", 8)]).unwrap();
        seeded.set("watched", &json).unwrap();

        let mut list = WatchedList::load(Arc::new(ReadOnlyStore(seeded)), "watched");
        let snapshot = list.entries().to_vec();
        assert_eq!(snapshot.len(), 1);

        assert!(list.add(entry("tt2", 6)).is_err());
        assert_eq!(list.entries(), snapshot.as_slice());
        assert!(!list.contains("tt2"));

        assert!(list.remove("tt1").is_err());
        assert_eq!(list.entries(), snapshot.as_slice());
        assert_eq!(list.user_rating("tt1"), Some(8));
    }

    #[test]
    fn test_summary_tracks_changes() {
        let store = Arc::new(MemoryStore::new());
        let mut list = WatchedList::load(store, "watched");
        assert_eq!(list.summary().count, 0);
        assert_eq!(list.summary().avg_user_rating, 0.0);

        list.add(entry("tt1", 8)).unwrap();
        list.add(entry("tt2", 6)).unwrap();
        let summary = list.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.avg_user_rating, 7.0);
        assert_eq!(summary.avg_runtime_minutes, 126.0);
    }
}
