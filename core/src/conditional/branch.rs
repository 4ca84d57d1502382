// pipewright/src/conditional/branch.rs

//! `when` and `if_else`: pick which middleware (if any) handles a value.
//!
//! Conditions are plain synchronous predicates over the current value and the
//! run history. They are evaluated exactly once per invocation, before any
//! asynchronous work, and the middleware that is not selected is never bound.

use crate::core::control::Control;
use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, Step};
use crate::error::StepError;
use std::sync::Arc;
use tracing::{event, Level};

/// See [`when`].
pub struct When<C, M> {
  condition: Arc<C>,
  middleware: Arc<M>,
}

/// Runs `middleware` if `condition(&value, &history)` holds; otherwise passes
/// the value through unchanged.
pub fn when<V, C, M>(condition: C, middleware: M) -> When<C, M>
where
  C: Fn(&V, &History<V>) -> bool + Send + Sync + 'static,
{
  When {
    condition: Arc::new(condition),
    middleware: Arc::new(middleware),
  }
}

impl<D, V, E, C, M> Middleware<D, V, E> for When<C, M>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
  C: Fn(&V, &History<V>) -> bool + Send + Sync + 'static,
  M: Middleware<D, V, E>,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let condition = Arc::clone(&self.condition);
    let middleware = Arc::clone(&self.middleware);
    Step::new(move |value: V, history: History<V>| {
      let selected = if condition(&value, &history) {
        event!(Level::TRACE, "when: condition met.");
        Some(middleware.bind(deps))
      } else {
        event!(Level::TRACE, "when: condition not met, passing value through.");
        None
      };
      async move {
        match selected {
          Some(step) => step.invoke(value, history).await,
          None => Ok(Control::Continue(value)),
        }
      }
    })
  }
}

/// See [`if_else`].
pub struct IfElse<C, T, F> {
  condition: Arc<C>,
  then_middleware: Arc<T>,
  else_middleware: Arc<F>,
}

/// Runs exactly one of `then_middleware` or `else_middleware`, chosen by
/// `condition(&value, &history)`.
pub fn if_else<V, C, T, F>(condition: C, then_middleware: T, else_middleware: F) -> IfElse<C, T, F>
where
  C: Fn(&V, &History<V>) -> bool + Send + Sync + 'static,
{
  IfElse {
    condition: Arc::new(condition),
    then_middleware: Arc::new(then_middleware),
    else_middleware: Arc::new(else_middleware),
  }
}

impl<D, V, E, C, T, F> Middleware<D, V, E> for IfElse<C, T, F>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
  C: Fn(&V, &History<V>) -> bool + Send + Sync + 'static,
  T: Middleware<D, V, E>,
  F: Middleware<D, V, E>,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let condition = Arc::clone(&self.condition);
    let then_middleware = Arc::clone(&self.then_middleware);
    let else_middleware = Arc::clone(&self.else_middleware);
    Step::new(move |value: V, history: History<V>| {
      let step = if condition(&value, &history) {
        event!(Level::TRACE, "if_else: taking the then branch.");
        then_middleware.bind(deps)
      } else {
        event!(Level::TRACE, "if_else: taking the else branch.");
        else_middleware.bind(deps)
      };
      step.invoke(value, history)
    })
  }
}
