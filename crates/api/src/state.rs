use std::sync::Arc;

use copydesk_core::store::CopyStore;

use crate::config::AppConfig;
use crate::github::RebuildDispatcher;

/// Shared application state, passed to all handlers via Axum's `State`
/// extractor. Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pub store: CopyStore,
    pub config: AppConfig,
    pub dispatcher: Arc<dyn RebuildDispatcher>,
}

impl AppState {
    pub fn new(
        store: CopyStore,
        config: AppConfig,
        dispatcher: impl RebuildDispatcher + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                dispatcher: Arc::new(dispatcher),
            }),
        }
    }

    pub fn store(&self) -> &CopyStore {
        &self.inner.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn dispatcher(&self) -> &dyn RebuildDispatcher {
        self.inner.dispatcher.as_ref()
    }
}
