// tests/pipeline_execution_tests.rs
mod common; // Reference the common module

use async_trait::async_trait;
use common::*;
use pipewright::{
  from_fn, handler, middlewares, pipe, stop, Control, Handler, History, MiddlewareExt, Pipe, RunStatus, SharedMiddleware,
  StepResult,
};
use serial_test::serial;
use std::sync::{atomic::Ordering, Arc, Mutex};

#[tokio::test]
async fn test_n_increments_resolve_to_initial_plus_n() {
  setup_tracing();
  let pipe = pipe(TestDeps::default());

  for n in 0..6 {
    let steps: Vec<SharedMiddleware<TestDeps, i64, TestError>> = (0..n).map(|_| add(1).shared()).collect();
    let result = pipe.run(10, &steps).await;
    assert_eq!(result, Ok(10 + n as i64), "with {} middlewares", n);
  }
}

#[tokio::test]
async fn test_empty_pipe_resolves_with_initial_value() {
  setup_tracing();
  let steps: Vec<SharedMiddleware<TestDeps, i64, TestError>> = middlewares![];
  let report = pipe(TestDeps::default()).run_detailed(42, &steps).await.unwrap();

  assert_eq!(report.value, 42);
  assert_eq!(report.status, RunStatus::Completed);
  assert!(report.history.is_empty());
}

#[tokio::test]
async fn test_history_records_inputs_not_outputs() {
  setup_tracing();
  let steps = middlewares![add(1), add(10), add(100)];
  let report = pipe(TestDeps::default()).run_detailed(0, &steps).await.unwrap();

  assert_eq!(report.value, 111);
  assert_eq!(report.status, RunStatus::Completed);
  assert_eq!(report.history, vec![0, 1, 11]);
}

#[tokio::test]
async fn test_each_step_sees_history_including_its_own_input() {
  setup_tracing();
  let seen: Arc<Mutex<Vec<Vec<i64>>>> = Arc::new(Mutex::new(Vec::new()));

  let record = {
    let seen = Arc::clone(&seen);
    from_fn(move |_deps: Arc<TestDeps>| {
      let seen = Arc::clone(&seen);
      move |value: i64, history: History<i64>| async move {
        seen.lock().unwrap().push(history.snapshot());
        Ok::<_, TestError>(Control::Continue(value * 2))
      }
    })
  };
  let record = Arc::new(record);

  let steps = middlewares![Arc::clone(&record), Arc::clone(&record), Arc::clone(&record)];
  let result = pipe(TestDeps::default()).run(1, &steps).await;

  assert_eq!(result, Ok(8));
  let seen = seen.lock().unwrap();
  assert_eq!(*seen, vec![vec![1], vec![1, 2], vec![1, 2, 4]]);
}

#[tokio::test]
#[serial]
async fn test_stop_resolves_with_previous_value_and_skips_rest() {
  setup_tracing();
  reset_counters();
  let counter = STEP_EXEC_COUNTER.clone();

  let steps = middlewares![
    counted_add(1, counter.clone()),
    counted_add(1, counter.clone()),
    stop("enough"),
    counted_add(1, counter.clone()),
    counted_add(1, counter.clone()),
  ];
  let report = pipe(TestDeps::default()).run_detailed(5, &steps).await.unwrap();

  assert_eq!(report.value, 7);
  match &report.status {
    RunStatus::Stopped(signal) => assert_eq!(signal.message(), Some("enough")),
    other => panic!("Expected RunStatus::Stopped, got {:?}", other),
  }
  assert_eq!(report.history.len(), 3);
  assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
#[serial]
async fn test_stop_at_first_step_resolves_with_initial_value() {
  setup_tracing();
  reset_counters();
  let counter = STEP_EXEC_COUNTER.clone();

  let steps = middlewares![stop("nothing to do"), counted_add(1, counter.clone())];
  let result = pipe(TestDeps::default()).run(3, &steps).await;

  assert_eq!(result, Ok(3));
  assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
#[serial]
async fn test_pipe_propagates_middleware_error() {
  setup_tracing();
  reset_counters();
  let counter = STEP_EXEC_COUNTER.clone();

  let steps = middlewares![
    counted_add(1, counter.clone()),
    failing("I am a bad step!"),
    counted_add(1, counter.clone()),
  ];
  let result = pipe(TestDeps::default()).run(0, &steps).await;

  assert_eq!(result, Err(TestError::Middleware("I am a bad step!".to_string())));
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_every_step_receives_the_same_dependency_bundle() {
  setup_tracing();
  let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));

  let record_deps = {
    let seen = Arc::clone(&seen);
    Arc::new(from_fn(move |deps: Arc<TestDeps>| {
      seen.lock().unwrap().push(Arc::as_ptr(&deps) as usize);
      move |value: i64, _history: History<i64>| async move { Ok::<_, TestError>(Control::Continue(value)) }
    }))
  };

  let pipe = Pipe::new(TestDeps::labelled("shared")).named("deps_identity");
  let steps = middlewares![Arc::clone(&record_deps), add(1), Arc::clone(&record_deps)];
  pipe.run(0, &steps).await.unwrap();

  let expected = Arc::as_ptr(pipe.deps()) as usize;
  assert_eq!(*seen.lock().unwrap(), vec![expected, expected]);
}

#[tokio::test]
async fn test_deps_are_visible_to_steps() {
  setup_tracing();
  let pipe = pipe(TestDeps {
    label: "triple".to_string(),
    factor: 3,
  });
  let steps = middlewares![add(1), scale_by_deps()];
  assert_eq!(pipe.run(1, &steps).await, Ok(6));
}

struct Doubler;

#[async_trait]
impl Handler<TestDeps, i64, TestError> for Doubler {
  async fn handle(&self, deps: Arc<TestDeps>, value: i64, _history: History<i64>) -> StepResult<i64, TestError> {
    tokio::task::yield_now().await;
    Ok(Control::Continue(value * 2 * deps.factor))
  }
}

#[tokio::test]
async fn test_struct_handler_runs_as_middleware() {
  setup_tracing();
  let steps = middlewares![handler(Doubler), add(1), handler(Doubler)];
  let result = pipe(TestDeps::labelled("x")).run(1, &steps).await;
  assert_eq!(result, Ok(6));
}
