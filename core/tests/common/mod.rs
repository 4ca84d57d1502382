// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use pipewright::{as_middleware, from_fn, Control, History, Middleware, PipeError};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Common Dependency Bundle ---
#[derive(Debug, Default)]
pub struct TestDeps {
  pub label: String,
  pub factor: i64,
}

impl TestDeps {
  pub fn labelled(label: &str) -> Self {
    TestDeps {
      label: label.to_string(),
      factor: 1,
    }
  }
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)] // Clone, PartialEq, Eq for assertions
pub enum TestError {
  #[error("pipewright error: {0}")]
  Pipe(String), // Store as String for Eq comparison

  #[error("Test middleware failed: {0}")]
  Middleware(String),
}

impl From<PipeError> for TestError {
  fn from(pe: PipeError) -> Self {
    TestError::Pipe(pe.to_string())
  }
}

// --- Common Middleware Creators ---

/// Adds `n` to the value.
pub fn add(n: i64) -> impl Middleware<TestDeps, i64, TestError> {
  as_middleware(move |value: i64| async move { Ok::<_, TestError>(value + n) })
}

/// Adds `n` and bumps `counter` every time the step actually runs.
pub fn counted_add(n: i64, counter: Arc<AtomicUsize>) -> impl Middleware<TestDeps, i64, TestError> {
  from_fn(move |_deps: Arc<TestDeps>| {
    let counter = Arc::clone(&counter);
    move |value: i64, _history: History<i64>| async move {
      counter.fetch_add(1, Ordering::SeqCst);
      Ok::<_, TestError>(Control::Continue(value + n))
    }
  })
}

/// Multiplies the value by the bundle's `factor`.
pub fn scale_by_deps() -> impl Middleware<TestDeps, i64, TestError> {
  from_fn(|deps: Arc<TestDeps>| {
    move |value: i64, _history: History<i64>| async move { Ok::<_, TestError>(Control::Continue(value * deps.factor)) }
  })
}

/// Fails with `TestError::Middleware(message)`.
pub fn failing(message: &'static str) -> impl Middleware<TestDeps, i64, TestError> {
  as_middleware(move |_value: i64| async move { Err::<i64, _>(TestError::Middleware(message.to_string())) })
}

/// Sleeps, then adds `n`. Used to make completion order differ from list order.
pub fn delayed_add(delay_ms: u64, n: i64) -> impl Middleware<TestDeps, i64, TestError> {
  as_middleware(move |value: i64| async move {
    tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    Ok::<_, TestError>(value + n)
  })
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::TRACE)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Atomic counters for checking execution counts ---
pub static STEP_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static BRANCH_START_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));
pub static CATCH_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  STEP_EXEC_COUNTER.store(0, Ordering::SeqCst);
  BRANCH_START_COUNTER.store(0, Ordering::SeqCst);
  CATCH_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
