use pypi_cleanup::cli::{CleanupOrchestrator, CleanupOutcome, RunMode};
use pypi_cleanup::credentials::Credentials;
use pypi_cleanup::error::{CleanupError, EXIT_FAILURE, EXIT_SAFETY};
use pypi_cleanup::index::{MockCall, MockIndex};
use std::collections::BTreeSet;

const FULL_HISTORY: &[&str] = &[
    "1.0.0.dev1", "1.0.0.dev2", "1.0.0.rc1", "1.0.0",
    "1.0.1.dev3", "1.0.1.dev5", "1.0.1.dev8", "1.0.1.dev13", "1.0.1.dev21", "1.0.1",
    "1.1.0.dev34", "1.1.0.dev54", "1.1.0.dev88", "1.1.0", "1.1.0.post1",
    "1.1.1.dev142", "1.1.1.dev230", "1.1.1.dev372",
    "2.0.0.dev602", "2.0.0.rc1", "2.0.0.rc2", "2.0.0.rc3", "2.0.0.rc4", "2.0.0",
    "2.0.1.dev974", "2.0.1.rc1", "2.0.1.rc2", "2.0.1.rc3",
];

const ONLY_DEVS: &[&str] = &[
    "1.0.0.dev1", "1.0.0.dev2",
    "1.0.1.dev3", "1.0.1.dev5", "1.0.1.dev8", "1.0.1.dev13", "1.0.1.dev21",
    "1.1.0.dev34", "1.1.0.dev54", "1.1.0.dev88",
    "1.1.1.dev142", "1.1.1.dev230", "1.1.1.dev372",
    "2.0.0.dev602",
    "2.0.1.dev974",
];

fn live() -> RunMode {
    RunMode::Live(Credentials::new(
        "release-bot",
        "hunter2",
        Some("123456".to_string()),
    ))
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|v| v.to_string()).collect()
}

fn expected_full_history_deletions() -> BTreeSet<String> {
    set(&[
        "1.0.0.dev1", "1.0.0.dev2", "1.0.0.rc1",
        "1.0.1.dev3", "1.0.1.dev5", "1.0.1.dev8", "1.0.1.dev13", "1.0.1.dev21",
        "1.1.0.dev34", "1.1.0.dev54", "1.1.0.dev88",
        "1.1.1.dev142",
        "2.0.0.dev602", "2.0.0.rc1", "2.0.0.rc2", "2.0.0.rc3", "2.0.0.rc4",
        "2.0.1.dev974",
    ])
}

fn has_delete_calls(index: &MockIndex) -> bool {
    index
        .calls()
        .iter()
        .any(|call| matches!(call, MockCall::Delete { .. }))
}

fn has_auth_calls(index: &MockIndex) -> bool {
    index
        .calls()
        .iter()
        .any(|call| matches!(call, MockCall::Authenticate { .. }))
}

#[tokio::test]
async fn test_preview_never_authenticates_or_deletes() {
    let index = MockIndex::new("duckdb").with_versions(FULL_HISTORY.iter().copied());
    let outcome = CleanupOrchestrator::new(index.clone(), 2, RunMode::Preview)
        .run()
        .await
        .unwrap();

    match outcome {
        CleanupOutcome::Preview { package, plan } => {
            assert_eq!(package, "duckdb");
            assert_eq!(plan.total(), FULL_HISTORY.len());
            assert_eq!(plan.version_set(), expected_full_history_deletions());
        }
        other => panic!("expected preview, got {:?}", other),
    }
    assert_eq!(index.calls(), vec![MockCall::Fetch]);
    assert_eq!(index.versions().len(), FULL_HISTORY.len());
}

#[tokio::test]
async fn test_preview_keep_zero_also_removes_unreleased_devs() {
    let index = MockIndex::new("duckdb").with_versions(FULL_HISTORY.iter().copied());
    let outcome = CleanupOrchestrator::new(index, 0, RunMode::Preview)
        .run()
        .await
        .unwrap();

    let CleanupOutcome::Preview { plan, .. } = outcome else {
        panic!("expected preview");
    };
    let mut expected = expected_full_history_deletions();
    expected.insert("1.1.1.dev230".to_string());
    expected.insert("1.1.1.dev372".to_string());
    assert_eq!(plan.version_set(), expected);
}

#[tokio::test]
async fn test_only_devs_keeps_latest_two_per_line() {
    let index = MockIndex::new("duckdb").with_versions(ONLY_DEVS.iter().copied());
    let outcome = CleanupOrchestrator::new(index, 2, RunMode::Preview)
        .run()
        .await
        .unwrap();

    let CleanupOutcome::Preview { plan, .. } = outcome else {
        panic!("expected preview");
    };
    assert_eq!(
        plan.version_set(),
        set(&["1.0.1.dev3", "1.0.1.dev5", "1.0.1.dev8", "1.1.0.dev34", "1.1.1.dev142"])
    );
}

#[tokio::test]
async fn test_only_devs_with_keep_zero_is_safety_error_without_login() {
    let index = MockIndex::new("duckdb").with_versions(ONLY_DEVS.iter().copied());
    let err = CleanupOrchestrator::new(index.clone(), 0, live())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CleanupError::Safety(_)));
    assert_eq!(err.exit_code(), EXIT_SAFETY);
    assert!(!has_auth_calls(&index));
    assert_eq!(index.versions().len(), ONLY_DEVS.len());
}

#[tokio::test]
async fn test_no_releases() {
    let index = MockIndex::new("empty-package");
    let outcome = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CleanupOutcome::NoReleases {
            package: "empty-package".to_string()
        }
    );
    assert!(!has_auth_calls(&index));
}

#[tokio::test]
async fn test_fetch_failure_is_index_unavailable() {
    let index = MockIndex::new("duckdb").failing_fetch("404 Not Found");
    let err = CleanupOrchestrator::new(index, 2, RunMode::Preview)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CleanupError::IndexUnavailable(_)));
    assert!(err
        .to_string()
        .contains("Failed to fetch package information"));
}

#[tokio::test]
async fn test_malformed_version_aborts_before_login() {
    let index = MockIndex::new("duckdb").with_versions(["1.0.0", "1.0.1.dev1", "1.0"]);
    let err = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CleanupError::Format { .. }));
    assert!(!has_auth_calls(&index));
}

#[tokio::test]
async fn test_live_run_deletes_plan_in_order() {
    let index = MockIndex::new("duckdb").with_versions(FULL_HISTORY.iter().copied());
    let outcome = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap();

    let CleanupOutcome::Live {
        package,
        total,
        deleted,
    } = outcome
    else {
        panic!("expected live outcome");
    };
    assert_eq!(package, "duckdb");
    assert_eq!(total, FULL_HISTORY.len());
    assert_eq!(deleted.len(), 18);
    assert_eq!(index.deleted(), deleted);
    assert_eq!(deleted.first().map(String::as_str), Some("1.0.0.dev1"));
    assert_eq!(deleted.last().map(String::as_str), Some("2.0.1.dev974"));

    let remaining = index.versions();
    for kept in ["1.0.0", "1.1.0.post1", "1.1.1.dev230", "1.1.1.dev372", "2.0.0", "2.0.1.rc3"] {
        assert!(remaining.contains(kept), "{} should survive", kept);
    }
    assert_eq!(
        index.calls().first(),
        Some(&MockCall::Fetch),
        "fetch must come first"
    );
    assert_eq!(
        index.calls().get(1),
        Some(&MockCall::Authenticate {
            username: "release-bot".to_string()
        })
    );
}

#[tokio::test]
async fn test_live_run_with_nothing_to_delete_skips_login() {
    let index = MockIndex::new("duckdb").with_versions(["1.0.0", "1.0.1.dev1"]);
    let outcome = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CleanupOutcome::Live {
            package: "duckdb".to_string(),
            total: 2,
            deleted: Vec::new(),
        }
    );
    assert_eq!(outcome.notices().len(), 1);
    assert_eq!(index.calls(), vec![MockCall::Fetch]);
}

#[tokio::test]
async fn test_rejected_credentials_delete_nothing() {
    let index = MockIndex::new("duckdb")
        .with_versions(FULL_HISTORY.iter().copied())
        .rejecting_credentials();
    let err = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CleanupError::Authentication(_)));
    assert_eq!(err.exit_code(), EXIT_FAILURE);
    assert!(!has_delete_calls(&index));
    assert_eq!(index.versions().len(), FULL_HISTORY.len());
}

#[tokio::test]
async fn test_partial_failure_attempts_every_version() {
    let index = MockIndex::new("duckdb")
        .with_versions(["1.0.0", "1.0.0.dev1", "1.0.0.dev2"])
        .failing_delete("1.0.0.dev2");
    let err = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to delete 1/2 versions");
    let CleanupError::PartialDeletion {
        failed,
        total,
        deleted,
        failures,
    } = err
    else {
        panic!("expected partial deletion");
    };
    assert_eq!(failed, 1);
    assert_eq!(total, 2);
    assert_eq!(deleted, vec!["1.0.0.dev1".to_string()]);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "1.0.0.dev2");
    assert_eq!(index.deleted(), vec!["1.0.0.dev1".to_string()]);
}

#[tokio::test]
async fn test_first_failure_does_not_stop_later_deletions() {
    let index = MockIndex::new("duckdb")
        .with_versions(["1.0.0", "1.0.0.dev1", "1.0.0.dev2"])
        .failing_delete("1.0.0.dev1");
    let err = CleanupOrchestrator::new(index.clone(), 2, live())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, CleanupError::PartialDeletion { failed: 1, total: 2, .. }));
    assert_eq!(index.deleted(), vec!["1.0.0.dev2".to_string()]);
}
