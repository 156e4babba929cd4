// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Status-wait primitive tests.
//!
//! Uses paused tokio time so backoff and deadlines run instantly and
//! deterministically.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tessera_sdk::poll::{PollConfig, wait_for_status};
use tessera_sdk::{ActivityStatus, SdkError, WorkspaceStatus};

fn fast_config() -> PollConfig {
    PollConfig::new()
        .with_interval(Duration::from_millis(100))
        .with_jitter(0.0)
        .with_deadline(Duration::from_secs(60))
}

/// Reader that replays a scripted sequence of results, counting reads.
fn scripted_reader<S: Copy + Send + 'static>(
    script: Vec<Result<S, SdkError>>,
    reads: Arc<AtomicUsize>,
) -> impl FnMut() -> std::future::Ready<Result<S, SdkError>> {
    let mut script = script.into_iter();
    move || {
        reads.fetch_add(1, Ordering::SeqCst);
        let next = script
            .next()
            .unwrap_or_else(|| panic!("reader polled more often than scripted"));
        std::future::ready(next)
    }
}

#[tokio::test(start_paused = true)]
async fn test_wait_returns_after_exactly_n_reads() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = scripted_reader(
        vec![
            Ok(ActivityStatus::Pending),
            Ok(ActivityStatus::InProgress),
            Ok(ActivityStatus::InProgress),
            Ok(ActivityStatus::Completed),
        ],
        reads.clone(),
    );

    let status = wait_for_status(
        "activity act_1",
        reader,
        ActivityStatus::Completed,
        &fast_config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(status, ActivityStatus::Completed);
    assert_eq!(reads.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn test_wait_immediate_match_costs_one_read() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = scripted_reader(vec![Ok(WorkspaceStatus::Inactive)], reads.clone());

    wait_for_status(
        "workspace ws_1",
        reader,
        WorkspaceStatus::Inactive,
        &fast_config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_wait_times_out_on_never_matching_reader() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reads_in_reader = reads.clone();
    let reader = move || {
        reads_in_reader.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(WorkspaceStatus::Draft))
    };

    let config = PollConfig::new()
        .with_interval(Duration::from_secs(2))
        .with_backoff(1.0)
        .with_jitter(0.0)
        .with_deadline(Duration::from_secs(10));

    let err = wait_for_status(
        "workspace ws_1",
        reader,
        WorkspaceStatus::Inactive,
        &config,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        SdkError::WaitTimeout {
            entity,
            target,
            waited_ms,
        } => {
            assert_eq!(entity, "workspace ws_1");
            assert_eq!(target, "INACTIVE");
            // The timeout is only reported once the deadline has elapsed.
            assert!(waited_ms >= 10_000);
        }
        other => panic!("expected WaitTimeout, got {:?}", other),
    }
    // 2s interval against a 10s deadline: reads at 0, 2, 4, 6 and 8 seconds,
    // then the final sleep runs out at the deadline itself.
    assert!(reads.load(Ordering::SeqCst) >= 4);
    assert!(reads.load(Ordering::SeqCst) <= 6);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_preempts_short_deadline() {
    // A wake that would land past the deadline must not turn into an instant
    // timeout; the token can still fire during the final sleep.
    let config = PollConfig::new()
        .with_interval(Duration::from_secs(60))
        .with_jitter(0.0)
        .with_deadline(Duration::from_secs(5));
    let cancel = CancellationToken::new();
    let cancel_in_task = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel_in_task.cancel();
    });

    let err = wait_for_status(
        "workspace ws_1",
        || std::future::ready(Ok(WorkspaceStatus::Draft)),
        WorkspaceStatus::Inactive,
        &config,
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SdkError::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn test_wait_aborts_on_terminal_failure_status() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = scripted_reader(
        vec![Ok(ActivityStatus::Pending), Ok(ActivityStatus::Failed)],
        reads.clone(),
    );

    let err = wait_for_status(
        "activity act_1",
        reader,
        ActivityStatus::Completed,
        &fast_config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        SdkError::WaitFailed { status, .. } => assert_eq!(status, "FAILED"),
        other => panic!("expected WaitFailed, got {:?}", other),
    }
    // No further reads after the failure status.
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_wait_surfaces_read_errors_after_budget() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reads_in_reader = reads.clone();
    let reader = move || {
        reads_in_reader.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Err::<ActivityStatus, _>(SdkError::Transport(
            "connection reset".to_string(),
        )))
    };

    let config = fast_config().with_read_error_budget(3);
    let err = wait_for_status(
        "activity act_1",
        reader,
        ActivityStatus::Completed,
        &config,
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SdkError::Transport(_)));
    assert_eq!(reads.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_successful_read_resets_error_budget() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = scripted_reader(
        vec![
            Err(SdkError::Transport("blip".to_string())),
            Err(SdkError::Transport("blip".to_string())),
            Ok(ActivityStatus::InProgress),
            Err(SdkError::Transport("blip".to_string())),
            Err(SdkError::Transport("blip".to_string())),
            Ok(ActivityStatus::Completed),
        ],
        reads.clone(),
    );

    let config = fast_config().with_read_error_budget(3);
    let status = wait_for_status(
        "activity act_1",
        reader,
        ActivityStatus::Completed,
        &config,
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(status, ActivityStatus::Completed);
    assert_eq!(reads.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_wait_cancelled_between_reads() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let reads = Arc::new(AtomicUsize::new(0));
    let reads_in_reader = reads.clone();
    let reader = move || {
        reads_in_reader.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok(WorkspaceStatus::Draft))
    };

    let err = wait_for_status(
        "workspace ws_1",
        reader,
        WorkspaceStatus::Inactive,
        &fast_config(),
        &cancel,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SdkError::Cancelled));
    // The read before the first sleep still happens; nothing after.
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_status_keeps_waiting() {
    let reads = Arc::new(AtomicUsize::new(0));
    let reader = scripted_reader(
        vec![Ok(WorkspaceStatus::Unknown), Ok(WorkspaceStatus::Inactive)],
        reads.clone(),
    );

    let status = wait_for_status(
        "workspace ws_1",
        reader,
        WorkspaceStatus::Inactive,
        &fast_config(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(status, WorkspaceStatus::Inactive);
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}
