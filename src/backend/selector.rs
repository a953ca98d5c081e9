use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{info, warn};

use super::{Backend, BackendEndpoints};
use crate::store::PreferenceStore;

/// Preference key recording which backend the user picked.
pub const PREFERENCE_KEY: &str = "nailedit-backend-preference";

/// Holds the active backend and persists the user's choice.
///
/// Shared by every client call. Reads are frequent; writes only happen on an
/// explicit switch, and the last write wins.
pub struct BackendSelector {
    endpoints: BackendEndpoints,
    active: RwLock<Backend>,
    preferences_path: Option<PathBuf>,
}

impl BackendSelector {
    /// Build a selector whose initial backend comes from the preferences
    /// file. Missing or unreadable storage means primary.
    pub fn load(endpoints: BackendEndpoints, preferences_path: Option<&Path>) -> Self {
        let active = preferences_path
            .map(read_preference)
            .unwrap_or(Backend::Primary);
        info!("Using {} backend: {}", active, endpoints.url(active));

        Self {
            endpoints,
            active: RwLock::new(active),
            preferences_path: preferences_path.map(Path::to_path_buf),
        }
    }

    /// A selector that never touches disk. Starts on primary.
    pub fn in_memory(endpoints: BackendEndpoints) -> Self {
        Self::load(endpoints, None)
    }

    pub fn endpoints(&self) -> &BackendEndpoints {
        &self.endpoints
    }

    pub fn active(&self) -> Backend {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Base URL of the active backend.
    pub fn current(&self) -> String {
        self.endpoints.url(self.active()).to_string()
    }

    pub fn url(&self, backend: Backend) -> &str {
        self.endpoints.url(backend)
    }

    /// Make secondary (or primary) the active backend, persist the choice
    /// and return the new base URL. No network call is made.
    pub fn switch(&self, use_secondary: bool) -> String {
        let backend = Backend::from_secondary_flag(use_secondary);
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = backend;

        if let Some(path) = &self.preferences_path {
            persist_preference(path, backend);
        }

        let url = self.endpoints.url(backend).to_string();
        info!("Using backend: {}", url);
        url
    }
}

fn read_preference(path: &Path) -> Backend {
    match PreferenceStore::open(path) {
        Ok(store) => match store.get(PREFERENCE_KEY).as_deref() {
            Some("secondary") => Backend::Secondary,
            _ => Backend::Primary,
        },
        Err(e) => {
            warn!("Backend preference unavailable, defaulting to primary: {}", e);
            Backend::Primary
        }
    }
}

fn persist_preference(path: &Path, backend: Backend) {
    let mut store = match PreferenceStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            warn!("Failed to open preferences, choice not persisted: {}", e);
            return;
        }
    };
    store.set(PREFERENCE_KEY, backend.as_str());
    if let Err(e) = store.save() {
        warn!("Failed to persist backend preference: {}", e);
    }
}
