use catalog::{
    AllocRegistration, CatalogServiceClient, CheckState, CheckStatus, ServiceRegistration,
    ServiceSpec, TaskServices,
};
use catalog_core::health::{self, AllocHealth};
use catalog_core::hooks::TaskServicesHook;
use catalog_core::testing::{MockCatalogServiceClient, OpKind};
use std::sync::Arc;
use std::thread;

fn alloc_tasks(alloc_id: &str) -> Vec<TaskServices> {
    vec![
        TaskServices::new(alloc_id, "web")
            .with_service(ServiceSpec::new("web").with_port_label("http").with_check("alive")),
        TaskServices::new(alloc_id, "cache").with_service(ServiceSpec::new("cache")),
    ]
}

#[test]
fn test_concurrent_allocations_register_and_deregister_once() {
    let client = Arc::new(MockCatalogServiceClient::new());
    let allocs: Vec<String> = (0..8).map(|i| format!("alloc-{}", i)).collect();

    let handles: Vec<_> = allocs
        .iter()
        .cloned()
        .map(|alloc_id| {
            let client: Arc<dyn CatalogServiceClient> = client.clone();
            thread::spawn(move || {
                let hooks: Vec<TaskServicesHook> = alloc_tasks(&alloc_id)
                    .into_iter()
                    .map(|t| TaskServicesHook::new(client.clone(), t))
                    .collect();

                for hook in &hooks {
                    hook.poststart().unwrap();
                    // Duplicate lifecycle events from a restarted watcher.
                    hook.poststart().unwrap();
                }
                for hook in &hooks {
                    hook.pre_kill();
                    hook.exited();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(client.ops().len(), allocs.len() * 2 * 2);
    for alloc_id in &allocs {
        for task in ["web", "cache"] {
            let kinds: Vec<OpKind> = client
                .ops_for_alloc(alloc_id)
                .iter()
                .filter(|op| op.task() == task)
                .map(|op| op.op())
                .collect();
            assert_eq!(kinds, vec![OpKind::Add, OpKind::Remove], "{}/{}", alloc_id, task);
        }
    }
}

#[test]
fn test_racing_events_for_one_task_stay_ordered() {
    let client = Arc::new(MockCatalogServiceClient::new());
    let hook = Arc::new(TaskServicesHook::new(
        client.clone(),
        alloc_tasks("a1").remove(0),
    ));
    hook.poststart().unwrap();

    let updaters: Vec<_> = (0..4)
        .map(|n| {
            let hook = hook.clone();
            thread::spawn(move || {
                let new = TaskServices::new("a1", "web")
                    .with_service(ServiceSpec::new("web").with_tags([format!("v{}", n)]));
                // Updates racing the kill may find the task already deregistered.
                let _ = hook.update(new);
            })
        })
        .collect();
    let killer = {
        let hook = hook.clone();
        thread::spawn(move || hook.pre_kill())
    };

    for handle in updaters {
        handle.join().unwrap();
    }
    killer.join().unwrap();

    let kinds: Vec<OpKind> = client.ops().iter().map(|op| op.op()).collect();
    assert_eq!(kinds.first(), Some(&OpKind::Add));
    assert_eq!(kinds.last(), Some(&OpKind::Remove));
    assert_eq!(kinds.iter().filter(|k| **k == OpKind::Remove).count(), 1);
    assert!(kinds[1..kinds.len() - 1]
        .iter()
        .all(|k| *k == OpKind::Update));
}

#[test]
fn test_health_follows_injected_registrations() {
    let mut reg = AllocRegistration::new();
    reg.insert(
        "web",
        ServiceRegistration::new("_a1-web-http", "web")
            .with_check(CheckStatus::new("alive", CheckState::Passing)),
    );
    reg.insert("cache", ServiceRegistration::new("_a1-cache", "cache"));

    let client = Arc::new(
        MockCatalogServiceClient::new().with_alloc_registrations_fn(move |id| {
            if id == "a1" {
                Ok(Some(reg.clone()))
            } else {
                Ok(None)
            }
        }),
    );

    let tasks = alloc_tasks("a1");
    let hooks: Vec<TaskServicesHook> = tasks
        .iter()
        .cloned()
        .map(|t| TaskServicesHook::new(client.clone(), t))
        .collect();
    for hook in &hooks {
        hook.poststart().unwrap();
    }

    assert_eq!(
        health::evaluate(client.as_ref(), "a1", &tasks).unwrap(),
        AllocHealth::Healthy
    );
    assert!(matches!(
        health::evaluate(client.as_ref(), "a2", &alloc_tasks("a2")).unwrap(),
        AllocHealth::Pending { .. }
    ));

    let kinds: Vec<OpKind> = client.ops().iter().map(|op| op.op()).collect();
    assert_eq!(
        kinds,
        vec![
            OpKind::Add,
            OpKind::Add,
            OpKind::AllocRegistrations,
            OpKind::AllocRegistrations
        ]
    );
}
