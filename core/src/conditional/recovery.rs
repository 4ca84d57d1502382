// pipewright/src/conditional/recovery.rs

//! `try_catch`: intercept whatever a middleware raises and hand it to a
//! recovery middleware.
//!
//! A catch middleware has its own two-phase contract ([`Catch`] and
//! [`CatchStep`]) because its step receives the raised condition in addition
//! to the value and history.

use crate::core::control::{Control, StopSignal};
use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, Step, StepFuture, StepResult};
use crate::error::StepError;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// What the attempted middleware raised.
#[derive(Debug)]
pub enum Raised<E> {
  /// It returned a stop signal.
  Stopped(StopSignal),
  /// It failed.
  Failed(E),
}

impl<E> Raised<E> {
  pub fn is_stop(&self) -> bool {
    matches!(self, Raised::Stopped(_))
  }

  pub fn failure(&self) -> Option<&E> {
    match self {
      Raised::Failed(error) => Some(error),
      Raised::Stopped(_) => None,
    }
  }

  pub fn into_failure(self) -> Option<E> {
    match self {
      Raised::Failed(error) => Some(error),
      Raised::Stopped(_) => None,
    }
  }
}

impl<E: fmt::Display> fmt::Display for Raised<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Raised::Stopped(signal) => fmt::Display::fmt(signal, f),
      Raised::Failed(error) => fmt::Display::fmt(error, f),
    }
  }
}

/// A catch middleware bound to a dependency bundle, ready to run once.
pub struct CatchStep<V, E> {
  call: Box<dyn FnOnce(Raised<E>, V, History<V>) -> StepFuture<V, E> + Send>,
}

impl<V: 'static, E: 'static> CatchStep<V, E> {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: FnOnce(Raised<E>, V, History<V>) -> Fut + Send + 'static,
    Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  {
    Self {
      call: Box::new(move |raised, value, history| -> StepFuture<V, E> { Box::pin(f(raised, value, history)) }),
    }
  }

  pub fn invoke(self, raised: Raised<E>, value: V, history: History<V>) -> StepFuture<V, E> {
    (self.call)(raised, value, history)
  }
}

/// The recovery half of [`try_catch`].
pub trait Catch<D, V, E>: Send + Sync + 'static {
  fn bind(&self, deps: Arc<D>) -> CatchStep<V, E>;
}

impl<D, V, E, C> Catch<D, V, E> for Arc<C>
where
  C: Catch<D, V, E> + ?Sized,
{
  fn bind(&self, deps: Arc<D>) -> CatchStep<V, E> {
    (**self).bind(deps)
  }
}

/// See [`catch_fn`].
pub struct CatchFn<F> {
  f: F,
}

/// Creates a catch middleware from a `deps -> (raised, value, history) -> future`
/// closure pair.
pub fn catch_fn<D, V, E, F, S, Fut>(f: F) -> CatchFn<F>
where
  F: Fn(Arc<D>) -> S + Send + Sync + 'static,
  S: FnOnce(Raised<E>, V, History<V>) -> Fut + Send + 'static,
  Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  V: 'static,
  E: 'static,
{
  CatchFn { f }
}

impl<D, V, E, F, S, Fut> Catch<D, V, E> for CatchFn<F>
where
  F: Fn(Arc<D>) -> S + Send + Sync + 'static,
  S: FnOnce(Raised<E>, V, History<V>) -> Fut + Send + 'static,
  Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  V: 'static,
  E: 'static,
{
  fn bind(&self, deps: Arc<D>) -> CatchStep<V, E> {
    CatchStep::new((self.f)(deps))
  }
}

/// See [`try_catch`].
pub struct TryCatch<T, C> {
  attempt: Arc<T>,
  recover: Arc<C>,
}

/// Runs `attempt`. If it fails or raises a stop signal, runs `recover` with
/// what was raised, the value `attempt` received, and the history, and
/// returns `recover`'s result. A failure inside `recover` propagates.
pub fn try_catch<T, C>(attempt: T, recover: C) -> TryCatch<T, C> {
  TryCatch {
    attempt: Arc::new(attempt),
    recover: Arc::new(recover),
  }
}

impl<D, V, E, T, C> Middleware<D, V, E> for TryCatch<T, C>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
  T: Middleware<D, V, E>,
  C: Catch<D, V, E>,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let attempt = Arc::clone(&self.attempt);
    let recover = Arc::clone(&self.recover);
    Step::new(move |value: V, history: History<V>| {
      let attempt_step = Middleware::bind(&*attempt, Arc::clone(&deps));
      let input = value.clone();
      async move {
        let raised = match attempt_step.invoke(value, history.clone()).await {
          Ok(Control::Continue(next)) => return Ok(Control::Continue(next)),
          Ok(Control::Stop(signal)) => Raised::Stopped(signal),
          Err(error) => Raised::Failed(error),
        };
        event!(Level::DEBUG, raised = %raised, "try_catch: intercepted, running recovery.");
        Catch::bind(&*recover, deps).invoke(raised, input, history).await
      }
    })
  }
}
