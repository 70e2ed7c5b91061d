use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::api::ApiSession;
use crate::settings::WorkspaceSettingsPage;

pub type SharedPage = Arc<Mutex<WorkspaceSettingsPage>>;

/// One viewer looking at one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    session: String,
    workspace: String,
}

impl PageKey {
    pub fn new(session: &ApiSession, workspace: &str) -> Self {
        PageKey {
            session: session.fingerprint(),
            workspace: workspace.to_string(),
        }
    }
}

struct Slot {
    page: SharedPage,
    last_used: Instant,
}

/// Live page instances. Mounting replaces the slot; submissions look it up.
#[derive(Default)]
pub struct PageStore {
    pages: DashMap<PageKey, Slot>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: PageKey, page: WorkspaceSettingsPage) -> SharedPage {
        let page = Arc::new(Mutex::new(page));
        self.pages.insert(
            key,
            Slot {
                page: page.clone(),
                last_used: Instant::now(),
            },
        );
        page
    }

    pub fn get(&self, key: &PageKey) -> Option<SharedPage> {
        self.pages.get_mut(key).map(|mut slot| {
            slot.last_used = Instant::now();
            slot.page.clone()
        })
    }

    /// Removes the slot only while it still holds `page`. A newer mount under
    /// the same key is left alone.
    pub fn remove_if_same(&self, key: &PageKey, page: &SharedPage) -> bool {
        self.pages
            .remove_if(key, |_, slot| Arc::ptr_eq(&slot.page, page))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Drops instances idle for at least `max_idle`. Pages with a submission
    /// in flight are kept regardless of age.
    pub fn sweep(&self, max_idle: Duration) -> usize {
        let before = self.pages.len();
        self.pages.retain(|_, slot| {
            slot.last_used.elapsed() < max_idle || slot.page.try_lock().is_err()
        });
        before.saturating_sub(self.pages.len())
    }
}

pub fn spawn_sweeper(store: Arc<PageStore>, max_idle: Duration) -> JoinHandle<()> {
    let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let removed = store.sweep(max_idle);
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "swept idle settings pages");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::fixtures;
    use crate::models::membership::MemberLevel;

    async fn page() -> WorkspaceSettingsPage {
        let api = fixtures::hosted_api(MemberLevel::Admin);
        WorkspaceSettingsPage::mount(&api, ApiSession::new("t"), fixtures::WORKSPACE_NAME)
            .await
            .expect("mount")
    }

    fn key(token: &str) -> PageKey {
        PageKey::new(&ApiSession::new(token), fixtures::WORKSPACE_NAME)
    }

    #[tokio::test]
    async fn insert_replaces_previous_instance() {
        let store = PageStore::new();
        let first = store.insert(key("a"), page().await);
        let second = store.insert(key("a"), page().await);

        assert_eq!(store.len(), 1);
        let current = store.get(&key("a")).expect("present");
        assert!(Arc::ptr_eq(&current, &second));
        assert!(!Arc::ptr_eq(&current, &first));
        assert!(store.get(&key("b")).is_none());
    }

    #[tokio::test]
    async fn stale_instance_cannot_evict_newer_mount() {
        let store = PageStore::new();
        let first = store.insert(key("a"), page().await);
        let second = store.insert(key("a"), page().await);

        assert!(!store.remove_if_same(&key("a"), &first));
        let current = store.get(&key("a")).expect("newer mount kept");
        assert!(Arc::ptr_eq(&current, &second));

        assert!(store.remove_if_same(&key("a"), &second));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn sweep_drops_idle_but_keeps_busy_pages() {
        let store = PageStore::new();
        store.insert(key("idle"), page().await);
        let busy = store.insert(key("busy"), page().await);
        let _guard = busy.lock().await;

        assert_eq!(store.sweep(Duration::ZERO), 1);
        assert!(store.get(&key("idle")).is_none());
        assert!(store.get(&key("busy")).is_some());
    }

    #[tokio::test]
    async fn recent_pages_survive_sweep() {
        let store = PageStore::new();
        store.insert(key("a"), page().await);
        assert_eq!(store.sweep(Duration::from_secs(60)), 0);
        assert!(!store.is_empty());
    }
}
