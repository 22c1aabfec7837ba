use std::sync::Arc;
use hh_core::config::AppConfig;
use hh_policy::HeaderPolicy;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<AppConfig>,
    pub policy: Arc<HeaderPolicy>,
}

impl AppState {
    pub fn new(cfg: Arc<AppConfig>, policy: Arc<HeaderPolicy>) -> Self {
        Self { cfg, policy }
    }
    pub fn config(&self) -> &AppConfig { &self.cfg }
}
