use std::sync::Arc;

use crate::history::HistoryStore;
use crate::inference::Models;

use super::config::CompatConfig;

#[derive(Clone)]
pub struct AppState {
    pub models: Models,
    pub history: Arc<HistoryStore>,
    pub compat: Arc<CompatConfig>,
}

impl AppState {
    pub fn new(models: Models, history: HistoryStore, compat: CompatConfig) -> Self {
        AppState {
            models,
            history: Arc::new(history),
            compat: Arc::new(compat),
        }
    }
}
