use crate::library::MediaMetadata;
use crate::probe::MediaProbe;
use crate::scanner;
use crate::subscriptions::{FolderResultsHandler, FolderResultsHub, SubscriptionId};
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Native directory chooser. `None` means the user cancelled.
pub trait FolderPicker: Send + Sync {
    fn pick_folder(&self) -> Option<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPhase {
    Idle,
    AwaitingUserChoice,
    Scanning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    Delivered { folder: PathBuf, count: usize },
    Cancelled,
    ScanFailed { folder: PathBuf, reason: String },
    /// Another selection cycle was already running; nothing was opened.
    Busy,
}

pub struct IngestOrchestrator {
    picker: Arc<dyn FolderPicker>,
    probe: MediaProbe,
    results: FolderResultsHub,
    phase: Mutex<IngestPhase>,
}

impl std::fmt::Debug for IngestOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestOrchestrator")
            .field("phase", &self.phase())
            .field("probe", &self.probe)
            .field("results", &self.results)
            .finish()
    }
}

impl IngestOrchestrator {
    pub fn new(picker: Arc<dyn FolderPicker>, probe: MediaProbe) -> Self {
        Self {
            picker,
            probe,
            results: FolderResultsHub::new(),
            phase: Mutex::new(IngestPhase::Idle),
        }
    }

    pub fn phase(&self) -> IngestPhase {
        *self.lock_phase()
    }

    pub fn subscribe(&self, handler: FolderResultsHandler) -> SubscriptionId {
        self.results.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.results.unsubscribe(id)
    }

    /// Runs one full selection cycle on the calling thread: picker, scan,
    /// delivery. Blocks for as long as the dialog is open.
    pub fn select_folder(&self) -> SelectionOutcome {
        let Some(cycle) = self.begin_cycle() else {
            log::info!("folder selection already in progress");
            return SelectionOutcome::Busy;
        };

        let Some(folder) = self.picker.pick_folder() else {
            log::debug!("folder selection cancelled");
            return SelectionOutcome::Cancelled;
        };

        cycle.advance(IngestPhase::Scanning);
        match scanner::scan(&folder) {
            Ok(files) => {
                let subscribers = self.results.publish(&files);
                log::debug!(
                    "delivered {} file(s) from {} to {subscribers} subscriber(s)",
                    files.len(),
                    folder.display()
                );
                SelectionOutcome::Delivered {
                    folder,
                    count: files.len(),
                }
            }
            Err(e) => {
                log::error!("could not read folder {}: {e}", folder.display());
                SelectionOutcome::ScanFailed {
                    folder,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Independent of the selection cycle; safe to call from many threads.
    pub fn process_video(&self, path: &Path) -> Result<MediaMetadata> {
        self.probe.probe(path)
    }

    fn begin_cycle(&self) -> Option<CycleGuard<'_>> {
        let mut phase = self.lock_phase();
        if *phase != IngestPhase::Idle {
            return None;
        }
        *phase = IngestPhase::AwaitingUserChoice;
        Some(CycleGuard { phase: &self.phase })
    }

    fn lock_phase(&self) -> MutexGuard<'_, IngestPhase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Puts the state machine back to `Idle` however the cycle ends.
struct CycleGuard<'a> {
    phase: &'a Mutex<IngestPhase>,
}

impl CycleGuard<'_> {
    fn advance(&self, next: IngestPhase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.advance(IngestPhase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IngestSettings;
    use crate::library::FileRecord;
    use std::collections::VecDeque;
    use std::sync::mpsc;

    /// Hands out queued answers, one per dialog.
    struct ScriptedPicker {
        answers: Mutex<VecDeque<Option<PathBuf>>>,
    }

    impl ScriptedPicker {
        fn new(answers: Vec<Option<PathBuf>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
            })
        }
    }

    impl FolderPicker for ScriptedPicker {
        fn pick_folder(&self) -> Option<PathBuf> {
            self.answers.lock().expect("answers").pop_front().flatten()
        }
    }

    fn orchestrator(picker: Arc<dyn FolderPicker>) -> IngestOrchestrator {
        let probe = MediaProbe::unavailable("ffmpeg", &IngestSettings::default(), std::env::temp_dir());
        IngestOrchestrator::new(picker, probe)
    }

    fn collect(orch: &IngestOrchestrator) -> mpsc::Receiver<Vec<FileRecord>> {
        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        orch.subscribe(Arc::new(move |files: &[FileRecord]| {
            let _ = tx.lock().expect("tx").send(files.to_vec());
        }));
        rx
    }

    #[test]
    fn cancel_delivers_nothing_and_returns_to_idle() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.mp4"), b"").expect("a");
        let orch = orchestrator(ScriptedPicker::new(vec![None, Some(dir.path().to_path_buf())]));
        let rx = collect(&orch);

        assert_eq!(orch.select_folder(), SelectionOutcome::Cancelled);
        assert_eq!(orch.phase(), IngestPhase::Idle);
        assert!(rx.try_recv().is_err());

        match orch.select_folder() {
            SelectionOutcome::Delivered { count, .. } => assert_eq!(count, 1),
            other => panic!("expected delivery, got {other:?}"),
        }
        assert_eq!(rx.try_recv().expect("delivery").len(), 1);
        assert_eq!(orch.phase(), IngestPhase::Idle);
    }

    #[test]
    fn scan_failure_delivers_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let orch = orchestrator(ScriptedPicker::new(vec![Some(dir.path().join("missing"))]));
        let rx = collect(&orch);

        assert!(matches!(
            orch.select_folder(),
            SelectionOutcome::ScanFailed { .. }
        ));
        assert!(rx.try_recv().is_err());
        assert_eq!(orch.phase(), IngestPhase::Idle);
    }

    struct BlockingPicker {
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<Option<PathBuf>>>,
    }

    impl FolderPicker for BlockingPicker {
        fn pick_folder(&self) -> Option<PathBuf> {
            let _ = self.entered.lock().expect("entered").send(());
            self.release.lock().expect("release").recv().ok().flatten()
        }
    }

    #[test]
    fn second_selection_while_dialog_open_is_busy() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let orch = Arc::new(orchestrator(Arc::new(BlockingPicker {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        })));

        let first = {
            let orch = Arc::clone(&orch);
            std::thread::spawn(move || orch.select_folder())
        };
        entered_rx.recv().expect("dialog opened");
        assert_eq!(orch.phase(), IngestPhase::AwaitingUserChoice);
        assert_eq!(orch.select_folder(), SelectionOutcome::Busy);

        release_tx.send(None).expect("release");
        assert_eq!(first.join().expect("join"), SelectionOutcome::Cancelled);
        assert_eq!(orch.phase(), IngestPhase::Idle);
    }

    #[test]
    fn panicking_subscriber_still_resets_phase() {
        let dir = tempfile::tempdir().expect("tempdir");
        let orch = Arc::new(orchestrator(ScriptedPicker::new(vec![Some(
            dir.path().to_path_buf(),
        )])));
        orch.subscribe(Arc::new(|_files: &[FileRecord]| panic!("subscriber blew up")));

        let worker = {
            let orch = Arc::clone(&orch);
            std::thread::spawn(move || orch.select_folder())
        };
        assert!(worker.join().is_err());
        assert_eq!(orch.phase(), IngestPhase::Idle);
    }
}
