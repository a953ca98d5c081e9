use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::backend::BackendSelector;
use crate::config::Settings;
use crate::error::Result;
use crate::store::SessionStore;

/// Everything the commands need, built once at startup.
pub struct AppState {
    settings: Settings,
    selector: Arc<BackendSelector>,
    client: ApiClient,
    session: SessionStore,
}

impl AppState {
    pub fn initialize(settings: Settings) -> Result<Self> {
        let selector = Arc::new(BackendSelector::load(
            settings.endpoints.clone(),
            settings.preferences_path.as_deref(),
        ));
        let client = ApiClient::new(Arc::clone(&selector), settings.request_timeout)?;
        let session = SessionStore::new(&settings.session_path);
        info!(
            "Initialized with primary={} secondary={}",
            settings.endpoints.primary(),
            settings.endpoints.secondary()
        );

        Ok(Self {
            settings,
            selector,
            client,
            session,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}
