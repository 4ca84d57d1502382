// pipewright/src/common.rs

//! Ready-made middlewares. They are ordinary implementations of the
//! [`Middleware`] contract and plug into any combinator.

use crate::core::control::{Control, StopSignal};
use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, Step};
use crate::error::{PipeError, StepError};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// See [`throw_error`].
#[derive(Debug, Clone)]
pub struct ThrowError {
  message: Arc<str>,
}

/// Always fails with [`PipeError::Thrown`] carrying `message`.
pub fn throw_error(message: impl Into<String>) -> ThrowError {
  ThrowError {
    message: Arc::from(message.into()),
  }
}

impl<D, V, E> Middleware<D, V, E> for ThrowError
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let message = self.message.to_string();
    Step::new(move |_value, _history| std::future::ready(Err(E::from(PipeError::Thrown { message }))))
  }
}

/// See [`stop`].
#[derive(Debug, Clone)]
pub struct Stop {
  signal: StopSignal,
}

/// Always raises a stop signal carrying `message`.
pub fn stop(message: impl Into<String>) -> Stop {
  Stop {
    signal: StopSignal::with_message(message),
  }
}

impl<D, V, E> Middleware<D, V, E> for Stop
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let signal = self.signal.clone();
    Step::new(move |_value, _history| std::future::ready(Ok(Control::Stop(signal))))
  }
}

/// See [`push_data`].
#[derive(Debug, Clone)]
pub struct PushData<V> {
  data: V,
}

/// Replaces the current value with a clone of `data`.
pub fn push_data<V>(data: V) -> PushData<V> {
  PushData { data }
}

impl<D, V, E> Middleware<D, V, E> for PushData<V>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let data = self.data.clone();
    Step::new(move |_value, _history| std::future::ready(Ok(Control::Continue(data))))
  }
}

/// See [`tap`].
pub struct Tap<F> {
  f: Arc<F>,
}

/// Awaits `f(value, history)` for its side effects, then continues with the
/// original value. An error from `f` fails the step.
pub fn tap<V, E, F, Fut>(f: F) -> Tap<F>
where
  F: Fn(V, History<V>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), E>> + Send + 'static,
{
  Tap { f: Arc::new(f) }
}

impl<D, V, E, F, Fut> Middleware<D, V, E> for Tap<F>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: Send + 'static,
  F: Fn(V, History<V>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), E>> + Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let f = Arc::clone(&self.f);
    Step::new(move |value: V, history: History<V>| {
      let side_effect = f(value.clone(), history);
      async move {
        side_effect.await?;
        Ok::<_, E>(Control::Continue(value))
      }
    })
  }
}

/// See [`log_value`].
#[derive(Debug, Clone)]
pub struct LogValue {
  level: Level,
  label: Arc<str>,
}

/// Emits a `tracing` event at `level` with the current value's `Debug` form,
/// then continues with the value unchanged.
pub fn log_value(level: Level, label: impl Into<String>) -> LogValue {
  LogValue {
    level,
    label: Arc::from(label.into()),
  }
}

impl<D, V, E> Middleware<D, V, E> for LogValue
where
  D: Send + Sync + 'static,
  V: PipeValue + Debug,
  E: Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let level = self.level;
    let label = Arc::clone(&self.label);
    Step::new(move |value: V, history: History<V>| {
      let step_index = history.len().saturating_sub(1);
      // event! needs a constant level.
      if level == Level::ERROR {
        event!(Level::ERROR, label = %label, step_index, value = ?value, "pipe value");
      } else if level == Level::WARN {
        event!(Level::WARN, label = %label, step_index, value = ?value, "pipe value");
      } else if level == Level::INFO {
        event!(Level::INFO, label = %label, step_index, value = ?value, "pipe value");
      } else if level == Level::DEBUG {
        event!(Level::DEBUG, label = %label, step_index, value = ?value, "pipe value");
      } else {
        event!(Level::TRACE, label = %label, step_index, value = ?value, "pipe value");
      }
      std::future::ready(Ok(Control::Continue(value)))
    })
  }
}
