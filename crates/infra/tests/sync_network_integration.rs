//! Integration tests for the sync coordinator with network scenarios.
//!
//! **Purpose**: exercise the critical path from database → coordinator →
//! network → database update.
//!
//! **Coverage:**
//! - Happy path: enqueue → sync pass → HTTP success → record removed
//! - Server error: failed attempt → retry counter incremented
//! - Exhausted retries: third failure abandons the record
//! - Mixed batch: one failure leaves the rest of the pass untouched
//! - Offline-then-online: connectivity restoration drains the queue without
//!   waiting on the timer
//!
//! **Infrastructure:**
//! - Real SQLite database (tempdir)
//! - WireMock HTTP server (simulates the club API)
//! - SyncCoordinator with real dependencies

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;
use std::time::Duration;

use clubsync_core::OperationQueue;
use clubsync_domain::{ConnectivityState, OperationKind, ResourceKind};
use clubsync_infra::database::SqliteOperationQueue;
use clubsync_infra::sync::{
    ApiClientConfig, ConnectivityMonitor, HttpOperationDispatcher, SyncCoordinator,
    SyncCoordinatorConfig, SyncOutcome,
};
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHECK_IN_PAYLOAD: &str = r#"{"sessionId":"s1","athleteId":"a1","status":"present"}"#;

fn test_config() -> SyncCoordinatorConfig {
    SyncCoordinatorConfig {
        dispatch_timeout: Duration::from_secs(2),
        join_timeout: Duration::from_secs(3),
        ..Default::default()
    }
}

async fn coordinator_against(
    server: &MockServer,
    repo: Arc<SqliteOperationQueue>,
    monitor: &ConnectivityMonitor,
) -> SyncCoordinator {
    let dispatcher = HttpOperationDispatcher::with_config(ApiClientConfig {
        base_url: server.uri(),
        timeout: Duration::from_secs(2),
    })
    .expect("dispatcher should build");

    SyncCoordinator::new(repo, Arc::new(dispatcher), monitor.subscribe(), test_config())
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_pass_drains_queue_on_success() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    let mock_server = MockServer::start().await;

    // The endpoint must receive the payload exactly as enqueued, once.
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .and(body_string(CHECK_IN_PAYLOAD))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/attendance"))
        .and(body_string(r#"{"entryId":"e1","mark":"late"}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    repo.enqueue(&support::make_operation(
        OperationKind::Create,
        ResourceKind::CheckIn,
        CHECK_IN_PAYLOAD,
    ))
    .await
    .expect("enqueue should succeed");
    repo.enqueue(&support::make_operation(
        OperationKind::Update,
        ResourceKind::Attendance,
        r#"{"entryId":"e1","mark":"late"}"#,
    ))
    .await
    .expect("enqueue should succeed");

    let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
    let coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    let outcome = coordinator.sync().await.expect("sync should succeed");
    match outcome {
        SyncOutcome::Completed(report) => {
            assert_eq!(report.attempted, 2);
            assert_eq!(report.synced, 2);
            assert_eq!(report.requeued, 0);
            assert_eq!(report.abandoned, 0);
        }
        SyncOutcome::Skipped => panic!("pass should not be skipped"),
    }

    assert!(repo.list_pending().await.expect("list should succeed").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_requeues_with_incremented_counter() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let id = repo
        .enqueue(&support::make_operation(
            OperationKind::Create,
            ResourceKind::CheckIn,
            CHECK_IN_PAYLOAD,
        ))
        .await
        .expect("enqueue should succeed");

    let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
    let coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    coordinator.sync().await.expect("sync should succeed");

    let pending = repo.list_pending().await.expect("list should succeed");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, id);
    assert_eq!(pending[0].retry_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn third_failed_pass_abandons_the_record() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    repo.enqueue(&support::make_operation(
        OperationKind::Create,
        ResourceKind::CheckIn,
        CHECK_IN_PAYLOAD,
    ))
    .await
    .expect("enqueue should succeed");

    let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
    let coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    coordinator.sync().await.expect("first pass succeeds");
    coordinator.sync().await.expect("second pass succeeds");
    let outcome = coordinator.sync().await.expect("third pass succeeds");

    match outcome {
        SyncOutcome::Completed(report) => {
            assert_eq!(report.abandoned, 1);
            assert_eq!(report.requeued, 0);
        }
        SyncOutcome::Skipped => panic!("pass should not be skipped"),
    }

    // Abandonment removed the record; only the diagnostic log remains.
    assert!(repo.list_pending().await.expect("list should succeed").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_batch_only_requeues_the_failing_record() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/leave-requests"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let _a = repo
        .enqueue(&support::make_operation(
            OperationKind::Create,
            ResourceKind::CheckIn,
            r#"{"sessionId":"s1","athleteId":"a1"}"#,
        ))
        .await
        .expect("enqueue A should succeed");
    let b = repo
        .enqueue(&support::make_operation(
            OperationKind::Create,
            ResourceKind::LeaveRequest,
            r#"{"memberId":"m1","reason":"travel"}"#,
        ))
        .await
        .expect("enqueue B should succeed");
    let _c = repo
        .enqueue(&support::make_operation(
            OperationKind::Create,
            ResourceKind::CheckIn,
            r#"{"sessionId":"s1","athleteId":"a2"}"#,
        ))
        .await
        .expect("enqueue C should succeed");

    let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
    let coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    coordinator.sync().await.expect("sync should succeed");

    let pending = repo.list_pending().await.expect("list should succeed");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, b);
    assert_eq!(pending[0].retry_count, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_enqueues_dispatch_exactly_once_each() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    const WRITERS: u64 = 8;

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .respond_with(ResponseTemplate::new(201))
        .expect(WRITERS)
        .mount(&mock_server)
        .await;

    // Simulated parallel callers racing on the same store.
    let mut handles = Vec::new();
    for i in 0..WRITERS {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            repo.enqueue(&support::make_operation(
                OperationKind::Create,
                ResourceKind::CheckIn,
                &format!(r#"{{"sessionId":"s1","athleteId":"a{i}"}}"#),
            ))
            .await
            .expect("concurrent enqueue should succeed")
        }));
    }
    for handle in handles {
        handle.await.expect("writer task should join");
    }

    let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
    let coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    coordinator.sync().await.expect("sync should succeed");

    // WireMock verifies expect(WRITERS) on drop: one request per record.
    assert!(repo.list_pending().await.expect("list should succeed").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn connectivity_restoration_drains_queue_without_timer() {
    let db = support::TestDatabase::new();
    let repo = Arc::new(SqliteOperationQueue::new(db.manager.clone()));

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check-ins"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&mock_server)
        .await;

    let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
    let mut coordinator = coordinator_against(&mock_server, repo.clone(), &monitor).await;

    // Interval far beyond the test horizon: only the connectivity signal can
    // trigger a pass.
    coordinator
        .start_auto_sync(Duration::from_secs(600))
        .await
        .expect("auto sync should start");

    repo.enqueue(&support::make_operation(
        OperationKind::Create,
        ResourceKind::CheckIn,
        r#"{"sessionId":"s1","athleteId":"a1"}"#,
    ))
    .await
    .expect("enqueue should succeed");
    repo.enqueue(&support::make_operation(
        OperationKind::Create,
        ResourceKind::CheckIn,
        r#"{"sessionId":"s1","athleteId":"a2"}"#,
    ))
    .await
    .expect("enqueue should succeed");

    // While offline, nothing is dispatched.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(repo.list_pending().await.expect("list should succeed").len(), 2);

    monitor.set_online();

    // The restoration-triggered pass drains both records.
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(repo.list_pending().await.expect("list should succeed").is_empty());

    coordinator.stop_auto_sync().await.expect("auto sync should stop");
}
