use std::sync::Arc;
use mp_core::ArticleStore;
use mp_inference::{GeneralResolver, QueryResolver};

pub struct AppState {
    pub resolver: Arc<QueryResolver>,
    pub general: Arc<GeneralResolver>,
    pub store: Arc<dyn ArticleStore>,
}

impl AppState {
    pub fn new(
        resolver: Arc<QueryResolver>,
        general: Arc<GeneralResolver>,
        store: Arc<dyn ArticleStore>,
    ) -> Self {
        Self {
            resolver,
            general,
            store,
        }
    }
}
