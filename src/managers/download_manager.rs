//! Download Manager.
//!
//! One [`DownloadController`] per download tracks the engine's download
//! operation by polling it every 100 ms. The controller is the only writer of
//! its state and byte counters; everything the UI needs is sent as a
//! [`DownloadEvent`] over a channel that the window drains on its control
//! thread. [`DownloadManager`] owns the window's list of controllers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::types::download::{
    DownloadEvent, DownloadId, DownloadItem, DownloadOperation, DownloadState, OperationSnapshot,
    OperationState,
};
use crate::types::errors::DownloadError;

/// Interval between two polls of a download operation.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Delay between the finish notification and the dismiss event.
pub const DISMISS_GRACE: Duration = Duration::from_secs(3);

/// What a single poll changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    /// Byte counters moved forward or the total became known.
    pub progressed: bool,
    pub transition: Option<DownloadState>,
}

/// Counters and state owned by one controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub state: DownloadState,
    pub bytes_received: u64,
    pub total_bytes: Option<u64>,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self {
            state: DownloadState::Pending,
            bytes_received: 0,
            total_bytes: None,
        }
    }
}

impl DownloadProgress {
    /// Percent complete, or `None` while the total size is unknown.
    pub fn percentage(&self) -> Option<f64> {
        if self.state == DownloadState::Completed {
            return Some(100.0);
        }
        match self.total_bytes {
            Some(total) if total > 0 => {
                Some((self.bytes_received as f64 / total as f64 * 100.0).min(100.0))
            }
            _ => None,
        }
    }

    /// Folds one poll result into the tracked state.
    ///
    /// Byte counters never decrease. Pending and terminal states ignore polls.
    pub fn observe(&mut self, snapshot: OperationSnapshot) -> Observation {
        if self.state.is_terminal() {
            if self.state == DownloadState::Cancelled
                && matches!(
                    snapshot.state,
                    OperationState::Completed | OperationState::Interrupted
                )
            {
                info!(
                    reported = ?snapshot.state,
                    "operation finished after cancellation; keeping cancelled"
                );
            }
            return Observation::default();
        }
        if self.state == DownloadState::Pending {
            return Observation::default();
        }

        let mut progressed = false;
        if snapshot.bytes_received > self.bytes_received {
            self.bytes_received = snapshot.bytes_received;
            progressed = true;
        } else if snapshot.bytes_received < self.bytes_received {
            debug!(
                tracked = self.bytes_received,
                reported = snapshot.bytes_received,
                "ignoring byte counter regression"
            );
        }
        if snapshot.total_bytes.is_some() && snapshot.total_bytes != self.total_bytes {
            self.total_bytes = snapshot.total_bytes;
            progressed = true;
        }

        let next = match (self.state, snapshot.state) {
            (_, OperationState::Completed) => DownloadState::Completed,
            (_, OperationState::Interrupted) => DownloadState::Interrupted,
            (DownloadState::Active, OperationState::Paused) => DownloadState::Paused,
            (DownloadState::Paused, OperationState::InProgress) => DownloadState::Active,
            (current, _) => current,
        };

        let transition = if next != self.state {
            self.state = next;
            Some(next)
        } else {
            None
        };

        Observation {
            progressed,
            transition,
        }
    }
}

/// State shared between a controller and its poll task.
struct Tracker {
    id: DownloadId,
    file_name: String,
    operation: Arc<dyn DownloadOperation>,
    progress: Mutex<DownloadProgress>,
    events: UnboundedSender<DownloadEvent>,
}

impl Tracker {
    fn lock(&self) -> MutexGuard<'_, DownloadProgress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: DownloadEvent) {
        // The receiver disappears when the window closes.
        if self.events.send(event).is_err() {
            debug!(id = %self.id, "download event dropped; window gone");
        }
    }

    /// Polls the operation once and emits the resulting events.
    fn tick(&self) -> Observation {
        let snapshot = self.operation.snapshot();
        let (observation, current) = {
            let mut progress = self.lock();
            let observation = progress.observe(snapshot);
            (observation, progress.clone())
        };

        if observation.progressed {
            self.emit(DownloadEvent::Progress {
                id: self.id.clone(),
                bytes_received: current.bytes_received,
                total_bytes: current.total_bytes,
                percentage: current.percentage(),
            });
        }

        if let Some(state) = observation.transition {
            info!(id = %self.id, %state, "download state changed");
            self.emit(DownloadEvent::StateChanged {
                id: self.id.clone(),
                state,
            });
            if matches!(state, DownloadState::Completed | DownloadState::Interrupted) {
                self.emit(DownloadEvent::Finished {
                    id: self.id.clone(),
                    state,
                    file_name: self.file_name.clone(),
                });
            }
        }

        observation
    }
}

async fn poll_loop(tracker: Arc<Tracker>) {
    let mut ticker = time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let final_state = loop {
        ticker.tick().await;
        tracker.tick();
        let state = tracker.lock().state;
        if state.is_terminal() {
            break state;
        }
    };

    debug!(id = %tracker.id, state = %final_state, "polling stopped");
    if matches!(final_state, DownloadState::Completed | DownloadState::Interrupted) {
        time::sleep(DISMISS_GRACE).await;
        tracker.emit(DownloadEvent::Dismiss {
            id: tracker.id.clone(),
        });
    }
}

/// Tracks and controls exactly one download.
///
/// The poll task is tied to the controller: it ends on a terminal state and
/// is aborted when the controller is cancelled or dropped.
pub struct DownloadController {
    tracker: Arc<Tracker>,
    save_path: PathBuf,
    poll_task: Option<JoinHandle<()>>,
}

impl DownloadController {
    pub fn new(
        operation: Arc<dyn DownloadOperation>,
        save_path: PathBuf,
        events: UnboundedSender<DownloadEvent>,
    ) -> Self {
        let file_name = file_name_of(&save_path);
        Self {
            tracker: Arc::new(Tracker {
                id: Uuid::new_v4().to_string(),
                file_name,
                operation,
                progress: Mutex::new(DownloadProgress::default()),
                events,
            }),
            save_path,
            poll_task: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.tracker.id
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    pub fn file_name(&self) -> &str {
        &self.tracker.file_name
    }

    pub fn state(&self) -> DownloadState {
        self.tracker.lock().state
    }

    pub fn progress(&self) -> DownloadProgress {
        self.tracker.lock().clone()
    }

    pub fn item(&self) -> DownloadItem {
        let progress = self.progress();
        DownloadItem {
            id: self.tracker.id.clone(),
            save_path: self.save_path.clone(),
            state: progress.state,
            bytes_received: progress.bytes_received,
            total_bytes: progress.total_bytes,
            percentage: progress.percentage(),
        }
    }

    /// Moves PENDING to ACTIVE and starts the 100 ms poll task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), DownloadError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| DownloadError::NoRuntime)?;
        {
            let mut progress = self.tracker.lock();
            if progress.state != DownloadState::Pending {
                return Err(DownloadError::InvalidTransition {
                    action: "start",
                    state: progress.state.to_string(),
                });
            }
            progress.state = DownloadState::Active;
        }

        self.tracker.emit(DownloadEvent::StateChanged {
            id: self.tracker.id.clone(),
            state: DownloadState::Active,
        });
        self.poll_task = Some(handle.spawn(poll_loop(Arc::clone(&self.tracker))));
        info!(id = %self.tracker.id, path = %self.save_path.display(), "download started");
        Ok(())
    }

    /// Polls once outside the timer. Terminal controllers ignore it.
    pub fn poll_now(&self) -> Observation {
        self.tracker.tick()
    }

    /// Asks the engine to pause. The state changes when a poll sees it.
    pub fn pause(&self) -> Result<(), DownloadError> {
        self.request(DownloadState::Active, "pause")?;
        self.tracker.operation.pause();
        Ok(())
    }

    /// Asks the engine to resume. The state changes when a poll sees it.
    pub fn resume(&self) -> Result<(), DownloadError> {
        self.request(DownloadState::Paused, "resume")?;
        self.tracker.operation.resume();
        Ok(())
    }

    /// Marks the download CANCELLED at once and asks the engine to cancel.
    ///
    /// Does not wait for the engine; later reports cannot undo the cancel.
    pub fn cancel(&mut self) -> Result<(), DownloadError> {
        {
            let mut progress = self.tracker.lock();
            if progress.state.is_terminal() {
                return Err(DownloadError::AlreadyFinished(self.tracker.id.clone()));
            }
            progress.state = DownloadState::Cancelled;
        }

        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        self.tracker.operation.cancel();
        info!(id = %self.tracker.id, "download cancelled");

        self.tracker.emit(DownloadEvent::StateChanged {
            id: self.tracker.id.clone(),
            state: DownloadState::Cancelled,
        });
        self.tracker.emit(DownloadEvent::Dismiss {
            id: self.tracker.id.clone(),
        });
        Ok(())
    }

    fn request(&self, required: DownloadState, action: &'static str) -> Result<(), DownloadError> {
        let state = self.state();
        if state.is_terminal() {
            return Err(DownloadError::AlreadyFinished(self.tracker.id.clone()));
        }
        if state != required {
            return Err(DownloadError::InvalidTransition {
                action,
                state: state.to_string(),
            });
        }
        Ok(())
    }
}

impl Drop for DownloadController {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Trait defining download management operations.
pub trait DownloadManagerTrait {
    fn start_download(
        &mut self,
        operation: Arc<dyn DownloadOperation>,
        save_path: PathBuf,
    ) -> Result<DownloadId, DownloadError>;
    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError>;
    fn get_download(&self, id: &str) -> Option<DownloadItem>;
    fn list_downloads(&self) -> Vec<DownloadItem>;
    /// Takes every pending event and forgets dismissed downloads.
    fn drain_events(&mut self) -> Vec<DownloadEvent>;
}

/// The downloads list of one window.
///
/// Mutated only from the window's control thread; controllers talk back
/// through the event channel.
pub struct DownloadManager {
    controllers: Vec<DownloadController>,
    events_tx: UnboundedSender<DownloadEvent>,
    events_rx: UnboundedReceiver<DownloadEvent>,
}

impl DownloadManager {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            controllers: Vec::new(),
            events_tx,
            events_rx,
        }
    }

    fn find(&self, id: &str) -> Result<&DownloadController, DownloadError> {
        self.controllers
            .iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut DownloadController, DownloadError> {
        self.controllers
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| DownloadError::NotFound(id.to_string()))
    }

    pub fn controller(&self, id: &str) -> Option<&DownloadController> {
        self.controllers.iter().find(|c| c.id() == id)
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl Default for DownloadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadManagerTrait for DownloadManager {
    fn start_download(
        &mut self,
        operation: Arc<dyn DownloadOperation>,
        save_path: PathBuf,
    ) -> Result<DownloadId, DownloadError> {
        let mut controller = DownloadController::new(operation, save_path, self.events_tx.clone());
        controller.start()?;
        let id = controller.id().to_string();
        self.controllers.push(controller);
        Ok(id)
    }

    fn pause_download(&mut self, id: &str) -> Result<(), DownloadError> {
        self.find(id)?.pause()
    }

    fn resume_download(&mut self, id: &str) -> Result<(), DownloadError> {
        self.find(id)?.resume()
    }

    fn cancel_download(&mut self, id: &str) -> Result<(), DownloadError> {
        self.find_mut(id)?.cancel()
    }

    fn get_download(&self, id: &str) -> Option<DownloadItem> {
        self.controller(id).map(DownloadController::item)
    }

    fn list_downloads(&self) -> Vec<DownloadItem> {
        self.controllers.iter().map(DownloadController::item).collect()
    }

    fn drain_events(&mut self) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            if let DownloadEvent::Dismiss { id } = &event {
                let before = self.controllers.len();
                self.controllers.retain(|c| c.id() != id.as_str());
                if before == self.controllers.len() {
                    warn!(%id, "dismiss for unknown download");
                }
            }
            events.push(event);
        }
        events
    }
}
