// pipewright/src/core/control.rs

//! Defines signals for controlling pipe flow and the outcome of a pipe run.

use std::fmt;

/// Cooperative request to stop the current pipe without failing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSignal {
  message: Option<String>,
}

impl StopSignal {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_message(message: impl Into<String>) -> Self {
    Self {
      message: Some(message.into()),
    }
  }

  pub fn message(&self) -> Option<&str> {
    self.message.as_deref()
  }
}

impl fmt::Display for StopSignal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.message {
      Some(message) => write!(f, "stopped: {}", message),
      None => f.write_str("stopped"),
    }
  }
}

/// What a step hands back to whoever invoked it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control<V> {
  /// Continue with this value as the next step's input.
  Continue(V),
  /// Stop the enclosing pipe. The pipe resolves with the value this step received.
  Stop(StopSignal),
}

impl<V> Control<V> {
  pub fn stop() -> Self {
    Control::Stop(StopSignal::new())
  }

  pub fn stop_with(message: impl Into<String>) -> Self {
    Control::Stop(StopSignal::with_message(message))
  }

  pub fn is_stop(&self) -> bool {
    matches!(self, Control::Stop(_))
  }

  pub fn into_value(self) -> Option<V> {
    match self {
      Control::Continue(value) => Some(value),
      Control::Stop(_) => None,
    }
  }
}

/// Outcome of a single branch of a concurrent fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branch<V> {
  Completed(V),
  /// The branch raised a stop signal. Siblings are unaffected.
  Stopped(StopSignal),
}

impl<V> Branch<V> {
  pub fn is_stopped(&self) -> bool {
    matches!(self, Branch::Stopped(_))
  }

  pub fn value(&self) -> Option<&V> {
    match self {
      Branch::Completed(value) => Some(value),
      Branch::Stopped(_) => None,
    }
  }

  pub fn into_value(self) -> Option<V> {
    match self {
      Branch::Completed(value) => Some(value),
      Branch::Stopped(_) => None,
    }
  }
}

impl<V> From<Control<V>> for Branch<V> {
  fn from(control: Control<V>) -> Self {
    match control {
      Control::Continue(value) => Branch::Completed(value),
      Control::Stop(signal) => Branch::Stopped(signal),
    }
  }
}

/// How a pipe run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
  /// Every middleware ran.
  Completed,
  /// A middleware raised a stop signal; later middlewares did not run.
  Stopped(StopSignal),
}

/// Full result of a pipe run: the final value, how the run ended, and the
/// input each step received.
#[derive(Debug, Clone)]
pub struct RunReport<V> {
  pub value: V,
  pub status: RunStatus,
  pub history: Vec<V>,
}

impl<V> RunReport<V> {
  pub fn is_stopped(&self) -> bool {
    matches!(self.status, RunStatus::Stopped(_))
  }

  pub fn into_value(self) -> V {
    self.value
  }
}
