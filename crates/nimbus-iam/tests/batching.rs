use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use nimbus_core::{AccessBinding, NimbusError, Policy, RetryPolicy, Subject, SubjectKind};
use nimbus_iam::{ApiIamUpdater, IamReconciler, KeyedLocks};
use nimbus_testkit::FakeAccessBindingService;

fn reconciler() -> IamReconciler {
    IamReconciler::new(Arc::new(KeyedLocks::new()))
        .with_retry_policy(RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(2))
}

fn big_desired(n: usize) -> Policy {
    Policy::from_bindings(
        (0..n)
            .map(|i| {
                AccessBinding::new(
                    "viewer",
                    Subject::new(SubjectKind::UserAccount, i.to_string()),
                )
            })
            .collect(),
    )
}

#[tokio::test]
async fn large_delta_is_split_into_sequential_batches() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("registry-1", vec![]);
    let updater = ApiIamUpdater::new(service.clone(), "registry", "registry-1");

    let desired = big_desired(2500);
    let result = reconciler().reconcile(&updater, &desired).await.unwrap();

    // 2500 adds at the remote limit of 1000: exactly three calls, in order
    assert_eq!(service.update_call_sizes(), vec![1000, 1000, 500]);
    assert_eq!(result.bindings.len(), 2500);
}

#[tokio::test]
async fn second_batch_failure_reports_committed_work() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("registry-1", vec![]);
    service.fail_update_call(2);
    let updater = ApiIamUpdater::new(service.clone(), "registry", "registry-1");

    let desired = big_desired(2500);
    let err = reconciler()
        .reconcile(&updater, &desired)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        NimbusError::PartialApply {
            committed_batches: 1,
            committed_deltas: 1000,
            ..
        }
    );
    // batch 1 committed, batch 2 rejected, batch 3 never attempted
    assert_eq!(service.update_call_sizes(), vec![1000, 1000]);
    assert_eq!(service.bindings_of("registry-1").len(), 1000);
}

#[tokio::test]
async fn first_batch_conflict_stays_retryable() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("registry-1", vec![]);
    service.inject_conflicts(1);
    let updater = ApiIamUpdater::new(service.clone(), "registry", "registry-1");

    let desired = big_desired(1500);
    let result = reconciler().reconcile(&updater, &desired).await.unwrap();

    // conflicted first call, then a fresh two-batch apply
    assert_eq!(service.update_call_sizes(), vec![1000, 1000, 500]);
    assert_eq!(result.bindings.len(), 1500);
}

#[tokio::test]
async fn rerun_after_partial_failure_converges() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("registry-1", vec![]);
    service.fail_update_call(2);
    let updater = ApiIamUpdater::new(service.clone(), "registry", "registry-1");
    let reconciler = reconciler();

    let desired = big_desired(2500);
    let err = reconciler.reconcile(&updater, &desired).await.unwrap_err();
    assert_matches!(err, NimbusError::PartialApply { .. });

    // re-running recomputes the delta from actual remote state: the 1000
    // committed deltas become no-ops and only the remainder is applied
    let result = reconciler.reconcile(&updater, &desired).await.unwrap();
    assert_eq!(result.bindings.len(), 2500);
    assert_eq!(service.update_call_sizes(), vec![1000, 1000, 1000, 500]);
}
