use crate::library::FileRecord;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub type FolderResultsHandler = Arc<dyn Fn(&[FileRecord]) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriptionId(u64);

/// Registry of listeners for completed folder scans.
#[derive(Default)]
pub struct FolderResultsHub {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, FolderResultsHandler)>>,
}

impl std::fmt::Debug for FolderResultsHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderResultsHub")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl FolderResultsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: FolderResultsHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, handler));
        id
    }

    /// Returns `false` when `id` was not (or no longer) registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hands `files` to every current subscriber, in registration order.
    /// Handlers run outside the registry lock and may unsubscribe themselves.
    pub fn publish(&self, files: &[FileRecord]) -> usize {
        let snapshot: Vec<FolderResultsHandler> =
            self.lock().iter().map(|(_, h)| Arc::clone(h)).collect();
        for handler in &snapshot {
            handler(files);
        }
        snapshot.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, FolderResultsHandler)>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }
}
