//! Widget session storage.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use uuid::Uuid;

use crate::widget::{ChatWidget, ResponseProvider, WidgetSettings};

/// Thread-safe store of chat widgets keyed by session ID.
///
/// Every widget created by the store shares the same response provider and
/// presentation settings.
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

#[derive(Debug)]
struct SessionStoreInner {
    provider: Arc<dyn ResponseProvider>,
    settings: WidgetSettings,
    sessions: RwLock<HashMap<String, ChatWidget>>,
}

impl SessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(provider: Arc<dyn ResponseProvider>, settings: WidgetSettings) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                provider,
                settings,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ChatWidget>> {
        self.inner
            .sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ChatWidget>> {
        self.inner
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a widget under a fresh random ID.
    #[must_use]
    pub fn create(&self) -> ChatWidget {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    /// Create a widget with a specific ID, replacing any existing one.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> ChatWidget {
        let id = id.into();
        let widget = ChatWidget::new(
            id.clone(),
            Arc::clone(&self.inner.provider),
            self.inner.settings,
        );
        self.write().insert(id, widget.clone());
        widget
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<ChatWidget> {
        self.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<ChatWidget> {
        self.write().remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove widgets idle for longer than `timeout`.
    ///
    /// Widgets with a connected page or a pending response are kept.
    /// Returns the number of sessions removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self.write();
        let before = guard.len();
        guard.retain(|_, widget| !widget.is_expired_with_timeout(timeout));
        before - guard.len()
    }

    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::CannedResponder;

    fn store() -> SessionStore {
        SessionStore::new(
            Arc::new(CannedResponder::default()),
            WidgetSettings::default(),
        )
    }

    #[test]
    fn test_session_store() {
        let store = store();
        assert!(store.is_empty());

        let widget = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(widget.id()).unwrap();
        assert_eq!(retrieved.id(), widget.id());

        store.remove(widget.id());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_get_returns_same_widget() {
        let store = store();
        let first = store.create_with_id("abc");
        first.submit("hi");
        let second = store.get("abc").unwrap();
        assert_eq!(second.message_count(), 1);
        assert_eq!(store.list_ids(), vec!["abc".to_string()]);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = store();
        let _ = store.create();
        let _ = store.create();
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_secs(60)), 0);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cleanup_keeps_widget_with_live_stream() {
        let store = store();
        let widget = store.create();
        let rx = widget.subscribe();
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 0);
        assert!(store.get(widget.id()).is_some());

        drop(rx);
        assert_eq!(store.cleanup_expired_with_timeout(Duration::ZERO), 1);
        assert!(store.is_empty());
    }
}
