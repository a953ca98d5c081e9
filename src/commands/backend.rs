use serde::Serialize;
use tracing::info;

use crate::backend::Backend;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendInfo {
    pub backend: Backend,
    pub url: String,
}

pub fn get_backend(state: &AppState) -> BackendInfo {
    let selector = state.selector();
    BackendInfo {
        backend: selector.active(),
        url: selector.current(),
    }
}

pub fn switch_backend(state: &AppState, use_secondary: bool) -> BackendInfo {
    info!("Switching backend (use_secondary={})", use_secondary);
    let url = state.selector().switch(use_secondary);
    BackendInfo {
        backend: Backend::from_secondary_flag(use_secondary),
        url,
    }
}
