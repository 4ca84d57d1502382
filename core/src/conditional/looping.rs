// pipewright/src/conditional/looping.rs

//! Pre-test (`loop_while`) and post-test (`do_while`) loops.
//!
//! Both keep a local iteration counter starting at 0 and hand it to the
//! condition together with the current value and the run history. The engine
//! imposes no iteration cap: a condition that never turns false never
//! terminates. A stop raised by the looped middleware ends the loop and
//! propagates to the enclosing pipe.

use crate::core::control::Control;
use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, Step};
use crate::error::StepError;
use std::sync::Arc;
use tracing::{event, Level};

/// See [`loop_while`].
pub struct LoopWhile<C, M> {
  condition: Arc<C>,
  middleware: Arc<M>,
}

/// Applies `middleware` while `condition(&value, iteration, &history)` holds,
/// checking before every application. Zero iterations are possible.
pub fn loop_while<V, C, M>(condition: C, middleware: M) -> LoopWhile<C, M>
where
  C: Fn(&V, usize, &History<V>) -> bool + Send + Sync + 'static,
{
  LoopWhile {
    condition: Arc::new(condition),
    middleware: Arc::new(middleware),
  }
}

impl<D, V, E, C, M> Middleware<D, V, E> for LoopWhile<C, M>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
  C: Fn(&V, usize, &History<V>) -> bool + Send + Sync + 'static,
  M: Middleware<D, V, E>,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let condition = Arc::clone(&self.condition);
    let middleware = Arc::clone(&self.middleware);
    Step::new(move |value: V, history: History<V>| async move {
      let mut current = value;
      let mut iteration = 0usize;
      while condition(&current, iteration, &history) {
        match middleware.bind(Arc::clone(&deps)).invoke(current, history.clone()).await? {
          Control::Continue(next) => current = next,
          Control::Stop(signal) => {
            event!(Level::DEBUG, iteration, %signal, "loop_while: body stopped.");
            return Ok(Control::Stop(signal));
          }
        }
        iteration += 1;
      }
      event!(Level::TRACE, iterations = iteration, "loop_while: finished.");
      Ok::<_, E>(Control::Continue(current))
    })
  }
}

/// See [`do_while`].
pub struct DoWhile<C, M> {
  condition: Arc<C>,
  middleware: Arc<M>,
}

/// Applies `middleware`, then repeats while
/// `condition(&value, completed_iterations, &history)` holds. Always runs at
/// least once.
pub fn do_while<V, C, M>(condition: C, middleware: M) -> DoWhile<C, M>
where
  C: Fn(&V, usize, &History<V>) -> bool + Send + Sync + 'static,
{
  DoWhile {
    condition: Arc::new(condition),
    middleware: Arc::new(middleware),
  }
}

impl<D, V, E, C, M> Middleware<D, V, E> for DoWhile<C, M>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
  C: Fn(&V, usize, &History<V>) -> bool + Send + Sync + 'static,
  M: Middleware<D, V, E>,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let condition = Arc::clone(&self.condition);
    let middleware = Arc::clone(&self.middleware);
    Step::new(move |value: V, history: History<V>| async move {
      let mut current = value;
      let mut iteration = 0usize;
      loop {
        match middleware.bind(Arc::clone(&deps)).invoke(current, history.clone()).await? {
          Control::Continue(next) => current = next,
          Control::Stop(signal) => {
            event!(Level::DEBUG, iteration, %signal, "do_while: body stopped.");
            return Ok(Control::Stop(signal));
          }
        }
        iteration += 1;
        if !condition(&current, iteration, &history) {
          break;
        }
      }
      event!(Level::TRACE, iterations = iteration, "do_while: finished.");
      Ok::<_, E>(Control::Continue(current))
    })
  }
}
