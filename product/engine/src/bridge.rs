use crate::ingest::IngestOrchestrator;
use crate::library::MediaMetadata;
use crate::subscriptions::{FolderResultsHandler, SubscriptionId};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Everything the UI process is allowed to ask of the host. Implementations
/// forward only; they must not touch the filesystem or spawn tools themselves.
pub trait HostBridge: Send + Sync {
    /// Starts the folder-picker flow and returns immediately. Results, if
    /// any, arrive through the folder-results subscription.
    fn select_folder(&self);

    fn subscribe_folder_results(&self, handler: FolderResultsHandler) -> SubscriptionId;

    fn unsubscribe_folder_results(&self, id: SubscriptionId) -> bool;

    fn process_video(&self, path: &str) -> Result<MediaMetadata>;
}

#[derive(Debug, Clone)]
pub struct IngestBridge {
    orchestrator: Arc<IngestOrchestrator>,
}

impl IngestBridge {
    pub fn new(orchestrator: Arc<IngestOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

impl HostBridge for IngestBridge {
    fn select_folder(&self) {
        let orchestrator = Arc::clone(&self.orchestrator);
        let spawned = std::thread::Builder::new()
            .name("clipvault-select-folder".to_string())
            .spawn(move || {
                orchestrator.select_folder();
            });
        if let Err(e) = spawned {
            log::error!("failed to start folder selection: {e}");
        }
    }

    fn subscribe_folder_results(&self, handler: FolderResultsHandler) -> SubscriptionId {
        self.orchestrator.subscribe(handler)
    }

    fn unsubscribe_folder_results(&self, id: SubscriptionId) -> bool {
        self.orchestrator.unsubscribe(id)
    }

    fn process_video(&self, path: &str) -> Result<MediaMetadata> {
        self.orchestrator.process_video(Path::new(path))
    }
}
