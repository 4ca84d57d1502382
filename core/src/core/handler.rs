// pipewright/src/core/handler.rs

//! Struct-style middlewares written as an `async fn` on a trait.
//!
//! Closures (see [`from_fn`](crate::from_fn)) suit small steps; services that
//! carry their own configuration usually read better as a type implementing
//! [`Handler`], adapted with [`handler`].

use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, Step, StepResult};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Handler<D, V, E>: Send + Sync + 'static
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: Send + 'static,
{
  /// Runs the step. `deps` is the run's dependency bundle; `history` holds
  /// the inputs of every step so far, including this one.
  async fn handle(&self, deps: Arc<D>, value: V, history: History<V>) -> StepResult<V, E>;
}

/// Adapter produced by [`handler`].
pub struct HandlerMiddleware<H> {
  handler: Arc<H>,
}

pub fn handler<H>(handler: H) -> HandlerMiddleware<H> {
  HandlerMiddleware {
    handler: Arc::new(handler),
  }
}

impl<D, V, E, H> Middleware<D, V, E> for HandlerMiddleware<H>
where
  H: Handler<D, V, E>,
  D: Send + Sync + 'static,
  V: PipeValue,
  E: Send + 'static,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let handler = Arc::clone(&self.handler);
    Step::new(move |value, history| async move { handler.handle(deps, value, history).await })
  }
}
