//! Property-based tests for download progress tracking.
//!
//! Whatever sequence of counters the engine reports, the tracked byte count
//! never decreases, the percentage stays within 0..=100, and once a download
//! reaches a terminal state nothing moves it again.

use browsershell::managers::download_manager::DownloadProgress;
use browsershell::types::download::{DownloadState, OperationSnapshot, OperationState};
use proptest::prelude::*;

fn arb_state() -> impl Strategy<Value = OperationState> {
    prop_oneof![
        6 => Just(OperationState::InProgress),
        2 => Just(OperationState::Paused),
        1 => Just(OperationState::Completed),
        1 => Just(OperationState::Interrupted),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = OperationSnapshot> {
    (0u64..10_000, proptest::option::of(1u64..10_000), arb_state()).prop_map(
        |(bytes_received, total_bytes, state)| OperationSnapshot {
            bytes_received,
            total_bytes,
            state,
        },
    )
}

fn active() -> DownloadProgress {
    DownloadProgress {
        state: DownloadState::Active,
        ..DownloadProgress::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn bytes_are_monotonic_and_percentage_bounded(
        snapshots in proptest::collection::vec(arb_snapshot(), 1..40),
    ) {
        let mut progress = active();
        let mut last_bytes = 0;

        for snapshot in snapshots {
            progress.observe(snapshot);
            prop_assert!(progress.bytes_received >= last_bytes);
            last_bytes = progress.bytes_received;
            if let Some(pct) = progress.percentage() {
                prop_assert!((0.0..=100.0).contains(&pct), "percentage out of range: {}", pct);
            }
        }
    }

    #[test]
    fn terminal_state_is_final(
        snapshots in proptest::collection::vec(arb_snapshot(), 1..40),
    ) {
        let mut progress = active();
        let mut terminal: Option<(DownloadState, u64, Option<u64>)> = None;

        for snapshot in snapshots {
            let observation = progress.observe(snapshot);
            match terminal {
                Some((state, bytes, total)) => {
                    prop_assert_eq!(observation.transition, None);
                    prop_assert!(!observation.progressed);
                    prop_assert_eq!(progress.state, state);
                    prop_assert_eq!(progress.bytes_received, bytes);
                    prop_assert_eq!(progress.total_bytes, total);
                }
                None if progress.state.is_terminal() => {
                    terminal = Some((progress.state, progress.bytes_received, progress.total_bytes));
                }
                None => {}
            }
        }
    }

    #[test]
    fn cancelled_never_becomes_completed(
        snapshots in proptest::collection::vec(arb_snapshot(), 1..20),
    ) {
        let mut progress = DownloadProgress {
            state: DownloadState::Cancelled,
            ..DownloadProgress::default()
        };
        for snapshot in snapshots {
            progress.observe(snapshot);
            prop_assert_eq!(progress.state, DownloadState::Cancelled);
            prop_assert_eq!(progress.bytes_received, 0);
        }
    }

    #[test]
    fn completed_reports_full_percentage(bytes in 0u64..10_000, total in 1u64..10_000) {
        let mut progress = active();
        progress.observe(OperationSnapshot {
            bytes_received: bytes,
            total_bytes: Some(total),
            state: OperationState::Completed,
        });
        prop_assert_eq!(progress.state, DownloadState::Completed);
        prop_assert_eq!(progress.percentage(), Some(100.0));
    }
}
