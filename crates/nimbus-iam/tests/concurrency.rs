use std::sync::Arc;
use std::time::Duration;

use nimbus_core::canonical::roles_to_members_map;
use nimbus_core::{RetryPolicy, Subject, SubjectKind};
use nimbus_iam::{ApiIamUpdater, BindingIntent, IamReconciler, KeyedLocks};
use nimbus_testkit::FakeAccessBindingService;

fn shared_reconciler() -> Arc<IamReconciler> {
    Arc::new(
        IamReconciler::new(Arc::new(KeyedLocks::new()))
            .with_retry_policy(RetryPolicy::fixed(Duration::from_millis(1)).with_max_attempts(3)),
    )
}

#[tokio::test]
async fn concurrent_additive_intents_both_land() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("disk-1", vec![]);
    let reconciler = shared_reconciler();

    let mut tasks = Vec::new();
    for id in ["1", "2", "3", "4"] {
        let service = service.clone();
        let reconciler = reconciler.clone();
        let intent = BindingIntent::AddMembers {
            role: "editor".into(),
            members: vec![Subject::new(SubjectKind::UserAccount, id)],
        };
        tasks.push(tokio::spawn(async move {
            let updater = ApiIamUpdater::new(service, "disk", "disk-1");
            reconciler.apply(&updater, &intent).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let map = roles_to_members_map(&service.bindings_of("disk-1"));
    assert_eq!(map["editor"].len(), 4);
}

#[tokio::test]
async fn racing_replace_role_intents_serialize() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("disk-1", vec![]);
    let reconciler = shared_reconciler();

    let left: Vec<Subject> = ["a", "b"]
        .iter()
        .map(|id| Subject::new(SubjectKind::UserAccount, *id))
        .collect();
    let right: Vec<Subject> = ["x", "y", "z"]
        .iter()
        .map(|id| Subject::new(SubjectKind::UserAccount, *id))
        .collect();

    let mut tasks = Vec::new();
    for members in [left.clone(), right.clone()] {
        let service = service.clone();
        let reconciler = reconciler.clone();
        let intent = BindingIntent::ReplaceRole {
            role: "editor".into(),
            members,
        };
        tasks.push(tokio::spawn(async move {
            let updater = ApiIamUpdater::new(service, "disk", "disk-1");
            reconciler.apply(&updater, &intent).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // serialized execution means the final membership is exactly one
    // intent's set, never an interleaved mix
    let map = roles_to_members_map(&service.bindings_of("disk-1"));
    let final_members: Vec<String> = map["editor"].iter().cloned().collect();
    let left_set: Vec<String> = left.iter().map(Subject::member).collect();
    let right_set: Vec<String> = right.iter().map(Subject::member).collect();
    assert!(
        final_members == left_set || final_members == right_set,
        "final members {final_members:?} must match one intent exactly"
    );
}

#[tokio::test]
async fn different_resources_reconcile_independently() {
    let service = Arc::new(FakeAccessBindingService::new());
    service.seed("disk-1", vec![]);
    service.seed("disk-2", vec![]);
    let reconciler = shared_reconciler();

    let mut tasks = Vec::new();
    for resource in ["disk-1", "disk-2"] {
        let service = service.clone();
        let reconciler = reconciler.clone();
        let intent = BindingIntent::AddMembers {
            role: "viewer".into(),
            members: vec![Subject::new(SubjectKind::UserAccount, "1")],
        };
        tasks.push(tokio::spawn(async move {
            let updater = ApiIamUpdater::new(service, "disk", resource);
            reconciler.apply(&updater, &intent).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(service.bindings_of("disk-1").len(), 1);
    assert_eq!(service.bindings_of("disk-2").len(), 1);
}
