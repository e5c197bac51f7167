use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use defer_core::OrchestratorConfig;
use defer_data::{ExecutionState, UnitError};
use defer_executor::{LoadError, LoadOrchestrator, LoadPlan};
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Text(String),
    Number(u32),
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn eager_only_run_waits_for_slowest_unit() {
    let plan = LoadPlan::builder()
        .eager("fast", || async {
            sleep(ms(100)).await;
            Ok(1u32)
        })
        .eager("slow", || async {
            sleep(ms(300)).await;
            Ok(2u32)
        })
        .eager("medium", || async {
            sleep(ms(200)).await;
            Ok(3u32)
        })
        .build()
        .unwrap();

    let result = LoadOrchestrator::default().run(plan).await.unwrap();

    assert!(result.ready_after() >= ms(300));
    assert!(result.ready_after() < ms(310));
    assert_eq!(result.value("fast"), Some(&1));
    assert_eq!(result.value("slow"), Some(&2));
    assert_eq!(result.value("medium"), Some(&3));
    assert!(result.pending_handles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn eager_failure_fails_run_without_waiting() {
    let plan = LoadPlan::builder()
        .eager("slow", || async {
            sleep(Duration::from_secs(10)).await;
            Ok(1u32)
        })
        .eager("broken", || async {
            sleep(ms(100)).await;
            Err(anyhow::anyhow!("upstream returned 503"))
        })
        .build()
        .unwrap();

    let start = Instant::now();
    let error = LoadOrchestrator::default().run(plan).await.unwrap_err();

    assert!(start.elapsed() < ms(200));
    match error {
        LoadError::Eager { unit, source } => {
            assert_eq!(unit, "broken");
            assert!(source.is_computation_failure());
            assert!(source.to_string().contains("upstream returned 503"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn simultaneous_eager_failures_report_first_declared() {
    let plan = LoadPlan::<u32>::builder()
        .eager("first", || async {
            sleep(ms(100)).await;
            Err(anyhow::anyhow!("first failed"))
        })
        .eager("second", || async {
            sleep(ms(100)).await;
            Err(anyhow::anyhow!("second failed"))
        })
        .build()
        .unwrap();

    let error = LoadOrchestrator::default().run(plan).await.unwrap_err();
    assert!(matches!(error, LoadError::Eager { ref unit, .. } if unit == "first"));
}

#[tokio::test(start_paused = true)]
async fn run_returns_before_deferred_units_resolve() {
    let plan = LoadPlan::builder()
        .eager("person", || async { Ok(Value::Text("John Doe".into())) })
        .deferred("later", || async {
            sleep(ms(5000)).await;
            Ok(Value::Number(7))
        })
        .build()
        .unwrap();

    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    assert!(result.ready_after() < ms(10));

    let handle = result.handle("later").unwrap();
    assert!(handle.current_state().is_pending());
    assert!(result.get("later").is_some_and(|slot| !slot.is_ready()));

    let settled = result.settle_all().await;
    assert_eq!(
        settled,
        vec![("later".to_string(), ExecutionState::Resolved(Value::Number(7)))]
    );
    assert_eq!(result.value("person"), Some(&Value::Text("John Doe".into())));
}

#[tokio::test(start_paused = true)]
async fn greeting_number_message_scenario() {
    let plan = LoadPlan::builder()
        .eager("eagerGreeting", || async { Ok(Value::Text("John Doe".into())) })
        .deferred("deferredNumber", || async {
            sleep(ms(1000)).await;
            Ok(Value::Number(42))
        })
        .deferred("deferredMessage", || async {
            sleep(ms(2000)).await;
            Ok(Value::Text("Hello deferred!".into()))
        })
        .build()
        .unwrap();

    let start = Instant::now();
    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    assert!(start.elapsed() < ms(10));
    assert_eq!(
        result.value("eagerGreeting"),
        Some(&Value::Text("John Doe".into()))
    );

    let number = result.handle("deferredNumber").unwrap();
    let message = result.handle("deferredMessage").unwrap();
    assert!(number.current_state().is_pending());
    assert!(message.current_state().is_pending());

    match number.settled().await {
        ExecutionState::Resolved(Value::Number(n)) => assert!(n < 100),
        other => panic!("unexpected state: {other:?}"),
    }
    let number_at = start.elapsed();
    assert!(number_at >= ms(1000) && number_at < ms(1100));
    assert!(message.current_state().is_pending());

    assert_eq!(
        message.settled().await,
        ExecutionState::Resolved(Value::Text("Hello deferred!".into()))
    );
    let message_at = start.elapsed();
    assert!(message_at >= ms(2000) && message_at < ms(2100));

    assert!(result.settle_duration("deferredNumber").unwrap() < ms(1100));
    assert!(result.settle_duration("deferredMessage").unwrap() >= ms(2000));
}

#[tokio::test(start_paused = true)]
async fn subscription_fires_once_per_handle() {
    let plan = LoadPlan::builder()
        .deferred("number", || async {
            sleep(ms(1000)).await;
            Ok(5u32)
        })
        .build()
        .unwrap();
    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    let handle = result.handle("number").unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);
    let _subscription = handle.subscribe(move |state| seen.lock().unwrap().push(state));

    for _ in 0..20 {
        let _ = handle.current_state();
        sleep(ms(100)).await;
    }

    assert_eq!(*calls.lock().unwrap(), vec![ExecutionState::Resolved(5)]);
}

#[tokio::test(start_paused = true)]
async fn deferred_failure_reaches_only_its_handle() {
    let plan = LoadPlan::builder()
        .eager("person", || async { Ok(1u32) })
        .deferred("broken", || async {
            sleep(ms(50)).await;
            Err(anyhow::anyhow!("stuff service down"))
        })
        .deferred("healthy", || async {
            sleep(ms(100)).await;
            Ok(2u32)
        })
        .build()
        .unwrap();

    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    assert_eq!(result.value("person"), Some(&1));

    let broken = result.handle("broken").unwrap().settled().await;
    match broken {
        ExecutionState::Failed(UnitError::ComputationFailure { unit, message }) => {
            assert_eq!(unit, "broken");
            assert!(message.contains("stuff service down"));
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert_eq!(
        result.handle("healthy").unwrap().settled().await,
        ExecutionState::Resolved(2)
    );
}

#[tokio::test(start_paused = true)]
async fn eager_deadline_is_enforced() {
    let plan = LoadPlan::builder()
        .eager("slow", || async {
            sleep(ms(1000)).await;
            Ok(1u32)
        })
        .build()
        .unwrap();
    let orchestrator =
        LoadOrchestrator::new(OrchestratorConfig::new().with_eager_deadline(ms(500)));

    let error = orchestrator.run(plan).await.unwrap_err();
    assert_eq!(error, LoadError::DeadlineExceeded(ms(500)));
    assert_eq!(orchestrator.current_navigation(), None);
}

#[tokio::test(start_paused = true)]
async fn new_navigation_detaches_previous_observers() {
    let orchestrator = LoadOrchestrator::default();
    let fired = Arc::new(AtomicUsize::new(0));

    let first = orchestrator
        .run(
            LoadPlan::builder()
                .deferred("number", || async {
                    sleep(ms(1000)).await;
                    Ok(1u32)
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    let handle = first.handle("number").unwrap();
    let counter = Arc::clone(&fired);
    let _subscription = handle.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(handle.observer_count(), 1);
    assert!(orchestrator.is_current(first.navigation_id()));

    let second = orchestrator
        .run(
            LoadPlan::builder()
                .eager("person", || async { Ok(2u32) })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!orchestrator.is_current(first.navigation_id()));
    assert!(orchestrator.is_current(second.navigation_id()));
    assert_eq!(handle.observer_count(), 0);

    sleep(ms(1500)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(handle.current_state(), ExecutionState::Resolved(1));
}

#[tokio::test(start_paused = true)]
async fn late_subscription_on_superseded_navigation_never_fires() {
    let orchestrator = LoadOrchestrator::default();
    let first = orchestrator
        .run(
            LoadPlan::builder()
                .deferred("number", || async {
                    sleep(ms(1000)).await;
                    Ok(1u32)
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();
    let _second = orchestrator
        .run(
            LoadPlan::builder()
                .eager("person", || async { Ok(2u32) })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let handle = first.handle("number").unwrap();
    let _subscription = handle.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(handle.observer_count(), 0);

    sleep(ms(1500)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(handle.current_state(), ExecutionState::Resolved(1));
}

#[tokio::test(start_paused = true)]
async fn abort_on_supersede_cancels_pending_units() {
    let orchestrator =
        LoadOrchestrator::new(OrchestratorConfig::new().with_abort_on_supersede(true));
    let finished = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&finished);
    let first = orchestrator
        .run(
            LoadPlan::builder()
                .deferred("number", move || async move {
                    sleep(ms(1000)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(1u32)
                })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    orchestrator.cancel_current();
    assert_eq!(orchestrator.current_navigation(), None);

    let handle = first.handle("number").unwrap();
    assert_eq!(
        handle.current_state(),
        ExecutionState::Failed(UnitError::Cancelled("number".to_string()))
    );

    sleep(ms(2000)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn abort_on_supersede_cancels_deferred_units_of_failed_navigation() {
    let orchestrator =
        LoadOrchestrator::new(OrchestratorConfig::new().with_abort_on_supersede(true));
    let finished = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&finished);
    let plan = LoadPlan::builder()
        .eager("person", || async {
            sleep(ms(100)).await;
            Err(anyhow::anyhow!("person service down"))
        })
        .deferred("number", move || async move {
            sleep(ms(1000)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1u32)
        })
        .build()
        .unwrap();

    let error = orchestrator.run(plan).await.unwrap_err();
    assert!(matches!(error, LoadError::Eager { ref unit, .. } if unit == "person"));
    assert_eq!(orchestrator.current_navigation(), None);

    sleep(ms(2000)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn navigation_superseded_while_loading() {
    let orchestrator = Arc::new(LoadOrchestrator::default());

    let background = Arc::clone(&orchestrator);
    let first = tokio::spawn(async move {
        let plan = LoadPlan::builder()
            .eager("slow", || async {
                sleep(ms(1000)).await;
                Ok(1u32)
            })
            .build()
            .unwrap();
        background.run(plan).await.map(|r| r.navigation_id())
    });

    sleep(ms(10)).await;
    let second = orchestrator
        .run(
            LoadPlan::builder()
                .eager("fast", || async { Ok(2u32) })
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let error = first.await.unwrap().unwrap_err();
    assert!(error.is_superseded());
    assert!(orchestrator.is_current(second.navigation_id()));
}

#[tokio::test(start_paused = true)]
async fn dropping_result_detaches_observers() {
    let plan = LoadPlan::builder()
        .deferred("number", || async {
            sleep(ms(1000)).await;
            Ok(1u32)
        })
        .build()
        .unwrap();
    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    let handle = result.handle("number").unwrap();

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let _subscription = handle.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    drop(result);
    assert_eq!(handle.observer_count(), 0);

    sleep(ms(1500)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert_eq!(
        handle.current_state(),
        ExecutionState::Failed(UnitError::Cancelled("number".to_string()))
    );
}

#[tokio::test]
async fn result_reports_declared_modes() {
    let plan = LoadPlan::builder()
        .eager("person", || async { Ok(1u32) })
        .build()
        .unwrap();
    assert_eq!(plan.len(), 1);

    let result = LoadOrchestrator::default().run(plan).await.unwrap();
    assert_eq!(result.iter().count(), 1);
    assert_eq!(result.mode("person"), Some(defer_data::UnitMode::Eager));
}
