use crate::api::WorkspaceApi;
use crate::config::Config;
use crate::store::PageStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn WorkspaceApi>,
    pub pages: Arc<PageStore>,
    pub config: Arc<Config>,
}
