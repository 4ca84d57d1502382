// tests/common_middleware_tests.rs
mod common;

use common::*;
use anyhow::Context as _;
use pipewright::{
  as_middleware, ask, from_fn, log_value, middlewares, pipe, push_data, tap, throw_error, Control, History, Middleware,
  PipeError,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tracing::Level;

fn add_some(n: i64) -> impl Middleware<TestDeps, Option<i64>, TestError> {
  as_middleware(move |value: Option<i64>| async move { Ok::<_, TestError>(value.map(|v| v + n)) })
}

// --- ask ---

#[tokio::test]
async fn test_ask_returns_input_of_earlier_step() {
  setup_tracing();
  // History: [Some(1), Some(2), Some(3)] by the time `ask` runs.
  let steps = middlewares![add_some(1), add_some(1), ask(1)];
  let result = pipe(TestDeps::default()).run(Some(1), &steps).await;
  assert_eq!(result, Ok(Some(2)));
}

#[tokio::test]
async fn test_ask_can_return_its_own_input() {
  setup_tracing();
  let steps = middlewares![add_some(5), ask(1), add_some(1)];
  assert_eq!(pipe(TestDeps::default()).run(Some(0), &steps).await, Ok(Some(6)));
}

#[tokio::test]
async fn test_ask_out_of_range_yields_absent() {
  setup_tracing();
  let steps = middlewares![add_some(1), ask(10)];
  assert_eq!(pipe(TestDeps::default()).run(Some(1), &steps).await, Ok(None));

  let json_steps = middlewares![push_data(json!({"k": 1})), ask(7)];
  let result: Result<Value, TestError> = pipe(TestDeps::default()).run(json!(0), &json_steps).await;
  assert_eq!(result, Ok(Value::Null));
}

// --- throw_error ---

#[tokio::test]
async fn test_throw_error_fails_in_callers_error_type() {
  setup_tracing();
  let steps = middlewares![add(1), throw_error("custom failure"), add(1)];
  let result = pipe(TestDeps::default()).run(0, &steps).await;

  let expected = PipeError::Thrown {
    message: "custom failure".to_string(),
  };
  assert_eq!(result, Err(TestError::from(expected)));
  match result {
    Err(TestError::Pipe(message)) => assert!(message.contains("custom failure")),
    other => panic!("Expected TestError::Pipe, got {:?}", other),
  }
}

// --- anyhow failures inside PipeError middlewares ---

fn read_port(raw: &str) -> anyhow::Result<u16> {
  raw.trim().parse::<u16>().with_context(|| format!("invalid port {:?}", raw))
}

fn parse_port() -> impl Middleware<TestDeps, String, PipeError> {
  from_fn(|_deps: Arc<TestDeps>| {
    move |raw: String, _history: History<String>| async move {
      let port = read_port(&raw)?;
      Ok::<_, PipeError>(Control::Continue(format!("port={}", port)))
    }
  })
}

#[tokio::test]
async fn test_anyhow_error_surfaces_as_handler_error() {
  setup_tracing();
  let steps = middlewares![parse_port()];
  let pipe = pipe(TestDeps::default());

  assert_eq!(pipe.run(" 8080 ".to_string(), &steps).await.unwrap(), "port=8080");

  match pipe.run("eighty".to_string(), &steps).await {
    Err(PipeError::HandlerError { source }) => assert!(source.to_string().contains("invalid port")),
    other => panic!("Expected PipeError::HandlerError, got {:?}", other),
  }
}

#[tokio::test]
async fn test_thrown_pipe_error_is_not_rewrapped_through_anyhow() {
  setup_tracing();
  let rethrow = from_fn(|_deps: Arc<TestDeps>| {
    move |_raw: String, _history: History<String>| async move {
      let inner: anyhow::Result<()> = Err(anyhow::Error::new(PipeError::Thrown {
        message: "already a pipe error".to_string(),
      }));
      inner?;
      Ok::<_, PipeError>(Control::Continue(String::new()))
    }
  });
  let steps = middlewares![rethrow];

  match pipe(TestDeps::default()).run(String::new(), &steps).await {
    Err(PipeError::Thrown { message }) => assert_eq!(message, "already a pipe error"),
    other => panic!("Expected PipeError::Thrown, got {:?}", other),
  }
}

// --- push_data ---

#[tokio::test]
async fn test_push_data_replaces_value() {
  setup_tracing();
  let steps = middlewares![add(1), push_data(100), add(1)];
  let report = pipe(TestDeps::default()).run_detailed(0, &steps).await.unwrap();

  assert_eq!(report.value, 101);
  assert_eq!(report.history, vec![0, 1, 100]);
}

// --- tap / log_value ---

#[tokio::test]
async fn test_tap_observes_without_changing_value() {
  setup_tracing();
  let observed: Arc<Mutex<Vec<(i64, usize)>>> = Arc::new(Mutex::new(Vec::new()));

  let observer = {
    let observed = Arc::clone(&observed);
    tap(move |value: i64, history: History<i64>| {
      let observed = Arc::clone(&observed);
      async move {
        observed.lock().unwrap().push((value, history.len()));
        Ok::<_, TestError>(())
      }
    })
  };

  let steps = middlewares![add(2), observer, add(3)];
  assert_eq!(pipe(TestDeps::default()).run(0, &steps).await, Ok(5));
  assert_eq!(*observed.lock().unwrap(), vec![(2, 2)]);
}

#[tokio::test]
async fn test_tap_failure_fails_the_pipe() {
  setup_tracing();
  let broken = tap(|_value: i64, _history: History<i64>| async move {
    Err::<(), _>(TestError::Middleware("audit sink down".to_string()))
  });
  let steps = middlewares![broken, add(1)];
  assert_eq!(
    pipe(TestDeps::default()).run(0, &steps).await,
    Err(TestError::Middleware("audit sink down".to_string()))
  );
}

#[tokio::test]
async fn test_log_value_passes_value_through_at_every_level() {
  setup_tracing();
  let steps = middlewares![
    log_value(Level::ERROR, "e"),
    log_value(Level::WARN, "w"),
    log_value(Level::INFO, "i"),
    add(1),
    log_value(Level::DEBUG, "d"),
    log_value(Level::TRACE, "t"),
  ];
  assert_eq!(pipe(TestDeps::default()).run(41, &steps).await, Ok(42));
}
