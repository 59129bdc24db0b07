use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use popcorn_core::{FileStore, KeyValueStore, Session, WatchedList};
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;

/// Paths and validated configuration, shared by every command.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create popcorn directories: {:#}", e))?;
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {:#}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {:#}", config_file.display(), e))?;
        Ok(Self { paths, config })
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        let credentials_file = self.paths.credentials_file();
        let mut store = CredentialStore::new(credentials_file.clone());
        store
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {:#}", credentials_file.display(), e))?;
        Ok(store)
    }

    pub fn store(&self) -> Result<Arc<dyn KeyValueStore>> {
        let dir = self.paths.store_dir();
        let store = FileStore::new(&dir).map_err(|e| eyre!("{:#}", e))?;
        Ok(Arc::new(store))
    }

    pub fn source(&self) -> Result<Arc<dyn MovieSource>> {
        let api_key = self.credentials()?.resolve_api_key().ok_or_else(|| {
            eyre!(
                "No OMDb API key configured. Run 'popcorn config api-key' or set {}",
                API_KEY_ENV
            )
        })?;
        Ok(Arc::new(OmdbClient::from_config(&self.config.omdb, api_key)))
    }

    /// The watched list alone; no API key needed.
    pub fn watched(&self) -> Result<WatchedList> {
        Ok(WatchedList::load(self.store()?, &self.config.storage.watched_key))
    }

    pub fn session(&self) -> Result<Session> {
        Ok(Session::from_config(&self.config, self.source()?, self.store()?))
    }
}
