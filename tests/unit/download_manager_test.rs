//! Download lifecycle tests. Timers run on tokio's paused clock, so the
//! 100 ms poll and the 3 s dismiss grace elapse instantly.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use browsershell::managers::download_manager::{
    DownloadController, DownloadManager, DownloadManagerTrait, DISMISS_GRACE,
};
use browsershell::types::download::{
    DownloadEvent, DownloadOperation, DownloadState, OperationSnapshot, OperationState,
};
use browsershell::types::errors::DownloadError;
use tokio::sync::mpsc;

struct FakeOperation {
    snapshot: Mutex<OperationSnapshot>,
    requests: Mutex<Vec<&'static str>>,
}

impl FakeOperation {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshot: Mutex::new(OperationSnapshot {
                bytes_received: 0,
                total_bytes: None,
                state: OperationState::InProgress,
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn report(&self, bytes: u64, total: Option<u64>, state: OperationState) {
        *self.snapshot.lock().unwrap() = OperationSnapshot {
            bytes_received: bytes,
            total_bytes: total,
            state,
        };
    }

    fn requests(&self) -> Vec<&'static str> {
        self.requests.lock().unwrap().clone()
    }
}

impl DownloadOperation for FakeOperation {
    fn snapshot(&self) -> OperationSnapshot {
        *self.snapshot.lock().unwrap()
    }
    fn pause(&self) {
        self.requests.lock().unwrap().push("pause");
    }
    fn resume(&self) {
        self.requests.lock().unwrap().push("resume");
    }
    fn cancel(&self) {
        self.requests.lock().unwrap().push("cancel");
    }
}

async fn one_poll() {
    tokio::time::sleep(Duration::from_millis(150)).await;
}

fn save_path() -> PathBuf {
    PathBuf::from("/tmp/downloads/report.pdf")
}

#[tokio::test(start_paused = true)]
async fn test_start_moves_to_active_and_reports_progress() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    op.report(50, Some(200), OperationState::InProgress);
    one_poll().await;

    let events = mgr.drain_events();
    assert_eq!(
        events[0],
        DownloadEvent::StateChanged { id: id.clone(), state: DownloadState::Active }
    );
    assert!(events.contains(&DownloadEvent::Progress {
        id: id.clone(),
        bytes_received: 50,
        total_bytes: Some(200),
        percentage: Some(25.0),
    }));

    let item = mgr.get_download(&id).unwrap();
    assert_eq!(item.state, DownloadState::Active);
    assert_eq!(item.save_path, save_path());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_total_is_indeterminate() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    op.report(10, None, OperationState::InProgress);
    one_poll().await;

    assert_eq!(mgr.get_download(&id).unwrap().percentage, None);
    assert_eq!(mgr.get_download(&id).unwrap().bytes_received, 10);
}

#[tokio::test(start_paused = true)]
async fn test_completion_notifies_then_dismisses_after_grace() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    op.report(100, Some(100), OperationState::Completed);
    one_poll().await;

    let events = mgr.drain_events();
    assert!(events.contains(&DownloadEvent::Finished {
        id: id.clone(),
        state: DownloadState::Completed,
        file_name: "report.pdf".to_string(),
    }));
    assert!(!events.iter().any(|e| matches!(e, DownloadEvent::Dismiss { .. })));
    assert_eq!(mgr.get_download(&id).unwrap().percentage, Some(100.0));

    tokio::time::sleep(DISMISS_GRACE).await;

    let events = mgr.drain_events();
    assert_eq!(events, vec![DownloadEvent::Dismiss { id: id.clone() }]);
    assert!(mgr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interruption_is_terminal_with_notification() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    op.report(30, Some(100), OperationState::Interrupted);
    one_poll().await;

    let events = mgr.drain_events();
    assert!(events.contains(&DownloadEvent::Finished {
        id: id.clone(),
        state: DownloadState::Interrupted,
        file_name: "report.pdf".to_string(),
    }));
    assert_eq!(mgr.get_download(&id).unwrap().state, DownloadState::Interrupted);
}

#[tokio::test(start_paused = true)]
async fn test_pause_waits_for_engine() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    mgr.pause_download(&id).unwrap();
    assert_eq!(op.requests(), vec!["pause"]);
    assert_eq!(mgr.get_download(&id).unwrap().state, DownloadState::Active);

    op.report(5, None, OperationState::Paused);
    one_poll().await;
    assert_eq!(mgr.get_download(&id).unwrap().state, DownloadState::Paused);

    // Pausing twice is rejected; resuming is now allowed.
    assert!(matches!(
        mgr.pause_download(&id),
        Err(DownloadError::InvalidTransition { action: "pause", .. })
    ));
    mgr.resume_download(&id).unwrap();
    op.report(6, None, OperationState::InProgress);
    one_poll().await;
    assert_eq!(mgr.get_download(&id).unwrap().state, DownloadState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_resume_requires_paused() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();

    let err = mgr.resume_download(&id).unwrap_err();
    assert_eq!(
        err,
        DownloadError::InvalidTransition { action: "resume", state: "active".to_string() }
    );
    assert!(op.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_is_immediate_and_dismisses() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();
    mgr.drain_events();

    mgr.cancel_download(&id).unwrap();

    assert_eq!(mgr.get_download(&id).unwrap().state, DownloadState::Cancelled);
    assert_eq!(op.requests(), vec!["cancel"]);
    let events = mgr.drain_events();
    assert_eq!(
        events,
        vec![
            DownloadEvent::StateChanged { id: id.clone(), state: DownloadState::Cancelled },
            DownloadEvent::Dismiss { id: id.clone() },
        ]
    );
    assert!(mgr.get_download(&id).is_none());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_ignores_later_engine_report() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let op = FakeOperation::new();
    let mut controller = DownloadController::new(op.clone(), save_path(), tx);
    controller.start().unwrap();
    controller.pause().unwrap();
    op.report(5, None, OperationState::Paused);
    controller.poll_now();
    assert_eq!(controller.state(), DownloadState::Paused);

    controller.cancel().unwrap();
    op.report(100, Some(100), OperationState::Completed);
    controller.poll_now();

    assert_eq!(controller.state(), DownloadState::Cancelled);
    assert_eq!(controller.progress().bytes_received, 5);
    assert_eq!(
        controller.cancel(),
        Err(DownloadError::AlreadyFinished(controller.id().to_string()))
    );
}

#[tokio::test(start_paused = true)]
async fn test_terminal_state_ignores_further_polls() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();
    let id = mgr.start_download(op.clone(), save_path()).unwrap();
    op.report(100, Some(100), OperationState::Completed);
    one_poll().await;

    op.report(500, Some(900), OperationState::Interrupted);
    mgr.controller(&id).unwrap().poll_now();

    let item = mgr.get_download(&id).unwrap();
    assert_eq!(item.state, DownloadState::Completed);
    assert_eq!(item.bytes_received, 100);
    assert_eq!(item.total_bytes, Some(100));
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_downloads_are_independent() {
    let mut mgr = DownloadManager::new();
    let op_a = FakeOperation::new();
    let op_b = FakeOperation::new();
    let a = mgr.start_download(op_a.clone(), PathBuf::from("/tmp/a.bin")).unwrap();
    let b = mgr.start_download(op_b.clone(), PathBuf::from("/tmp/b.bin")).unwrap();

    op_a.report(10, Some(10), OperationState::Completed);
    op_b.report(4, Some(10), OperationState::InProgress);
    one_poll().await;

    assert_eq!(mgr.get_download(&a).unwrap().state, DownloadState::Completed);
    assert_eq!(mgr.get_download(&b).unwrap().state, DownloadState::Active);
    assert_eq!(mgr.get_download(&b).unwrap().percentage, Some(40.0));
    assert_eq!(mgr.list_downloads().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_id_is_not_found() {
    let mut mgr = DownloadManager::new();
    assert_eq!(
        mgr.pause_download("nope"),
        Err(DownloadError::NotFound("nope".to_string()))
    );
}

#[test]
fn test_start_without_runtime_fails_cleanly() {
    let mut mgr = DownloadManager::new();
    let op = FakeOperation::new();

    let err = mgr.start_download(op, save_path()).unwrap_err();

    assert_eq!(err, DownloadError::NoRuntime);
    assert!(mgr.is_empty());
    assert!(mgr.drain_events().is_empty());
}
