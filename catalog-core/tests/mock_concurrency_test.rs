use catalog::{CatalogServiceClient, TaskServices};
use catalog_core::testing::{MockCatalogOp, MockCatalogServiceClient, OpKind};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;
const CALLS_PER_THREAD: usize = 50;

fn alloc_id(i: usize) -> String {
    format!("alloc-{:03}", i)
}

#[test]
fn test_concurrent_calls_are_all_recorded() {
    let client = Arc::new(MockCatalogServiceClient::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = client.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let task = TaskServices::new(alloc_id(i), "web");
                barrier.wait();
                match i % 4 {
                    0 => client.register_task(&task).unwrap(),
                    1 => client.update_task(&task, &task).unwrap(),
                    2 => client.remove_task(&task),
                    _ => {
                        client.alloc_registrations(&task.alloc_id).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let ops = client.ops();
    assert_eq!(ops.len(), THREADS);

    // Every thread touched its own allocation, so no entry may be duplicated or lost.
    let allocs: HashSet<&str> = ops.iter().map(|op| op.alloc_id()).collect();
    assert_eq!(allocs.len(), THREADS);

    for op in &ops {
        let i: usize = op.alloc_id()["alloc-".len()..].parse().unwrap();
        let expected = match i % 4 {
            0 => OpKind::Add,
            1 => OpKind::Update,
            2 => OpKind::Remove,
            _ => OpKind::AllocRegistrations,
        };
        assert_eq!(op.op(), expected, "wrong kind recorded for {}", op.alloc_id());
    }
}

#[test]
fn test_snapshots_only_grow() {
    let client = Arc::new(MockCatalogServiceClient::new());

    let writers: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                for n in 0..CALLS_PER_THREAD {
                    let task = TaskServices::new(alloc_id(i), format!("task-{}", n));
                    client.register_task(&task).unwrap();
                }
            })
        })
        .collect();

    // Observe while writers run: each snapshot must extend the previous one.
    // Stops once every writer is done, so a panicking writer fails at join below.
    let mut previous: Vec<MockCatalogOp> = Vec::new();
    loop {
        let writers_done = writers.iter().all(|w| w.is_finished());
        let current = client.ops();
        assert!(current.len() >= previous.len());
        assert_eq!(&current[..previous.len()], &previous[..]);
        previous = current;
        if writers_done {
            break;
        }
        thread::yield_now();
    }

    for writer in writers {
        writer.join().unwrap();
    }
    assert_eq!(client.ops().len(), THREADS * CALLS_PER_THREAD);
}

#[test]
fn test_per_thread_order_is_preserved() {
    let client = Arc::new(MockCatalogServiceClient::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                let task = TaskServices::new(alloc_id(i), "web");
                client.register_task(&task).unwrap();
                client.update_task(&task, &task).unwrap();
                client.remove_task(&task);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(client.ops().len(), THREADS * 3);
    for i in 0..THREADS {
        let kinds: Vec<OpKind> = client
            .ops_for_alloc(&alloc_id(i))
            .iter()
            .map(|op| op.op())
            .collect();
        assert_eq!(kinds, vec![OpKind::Add, OpKind::Update, OpKind::Remove]);
    }
}

#[test]
fn test_register_waits_for_running_override() {
    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    let (entered_tx, entered_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let entered_tx = Mutex::new(entered_tx);
    let release_rx = Mutex::new(release_rx);

    let client = Arc::new(
        MockCatalogServiceClient::new().with_alloc_registrations_fn(move |_| {
            entered_tx.lock().unwrap().send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
            Ok(None)
        }),
    );

    let querier = {
        let client = client.clone();
        thread::spawn(move || client.alloc_registrations("a1").unwrap())
    };
    entered_rx.recv().unwrap();

    let registrar = {
        let client = client.clone();
        thread::spawn(move || {
            client
                .register_task(&TaskServices::new("a2", "web"))
                .unwrap()
        })
    };

    // The override holds the ledger lock, so the add cannot land yet. Reading
    // the ledger here would block as well.
    thread::sleep(Duration::from_millis(100));
    assert!(!registrar.is_finished());

    release_tx.send(()).unwrap();
    assert!(querier.join().unwrap().is_none());
    registrar.join().unwrap();

    assert_eq!(
        client.ops(),
        vec![
            MockCatalogOp::new("alloc_registrations", "a1", ""),
            MockCatalogOp::new("add", "a2", "web"),
        ]
    );
}

#[test]
fn test_overrides_never_overlap() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let in_override = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let (inside, max) = (in_override.clone(), max_seen.clone());
    let client = Arc::new(MockCatalogServiceClient::new().with_alloc_registrations_fn(
        move |_| {
            let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
            max.fetch_max(now, Ordering::SeqCst);
            thread::yield_now();
            inside.fetch_sub(1, Ordering::SeqCst);
            Ok(None)
        },
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let client = client.clone();
            thread::spawn(move || {
                for _ in 0..CALLS_PER_THREAD {
                    client.alloc_registrations(&alloc_id(i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(client.ops().len(), THREADS * CALLS_PER_THREAD);
}
