// pipewright/src/pipeline/flow.rs

//! Reusing a whole middleware list: as a single middleware ([`sub_pipe`]), as
//! a pipe shape bound to dependencies later ([`flow`]), and awaiting several
//! independent runs together ([`merge`]).

use crate::core::control::{Control, RunReport};
use crate::core::middleware::{Middleware, PipeValue, SharedMiddleware, Step};
use crate::error::StepError;
use crate::pipeline::definition::Pipe;
use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// A middleware list run as one middleware. See [`sub_pipe`].
pub struct SubPipe<D, V, E> {
  middlewares: Arc<[SharedMiddleware<D, V, E>]>,
}

/// Wraps `middlewares` so the whole list can be used wherever a single
/// middleware is expected.
///
/// Each invocation is a full run with its own history, starting from the
/// current value and using the outer binding's dependency bundle. A stop
/// inside the list ends that inner run only; the enclosing pipe continues
/// with the inner run's last value.
pub fn sub_pipe<D, V, E>(middlewares: Vec<SharedMiddleware<D, V, E>>) -> SubPipe<D, V, E> {
  SubPipe {
    middlewares: middlewares.into(),
  }
}

impl<D, V, E> Middleware<D, V, E> for SubPipe<D, V, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let middlewares = Arc::clone(&self.middlewares);
    Step::new(move |value, _history| async move {
      let report = Pipe::from_shared(deps)
        .named("sub_pipe")
        .run_detailed(value, &middlewares)
        .await?;
      if report.is_stopped() {
        event!(Level::DEBUG, "Sub-pipe stopped early; outer pipe continues.");
      }
      Ok::<_, E>(Control::Continue(report.value))
    })
  }
}

impl<D, V, E> Clone for SubPipe<D, V, E> {
  fn clone(&self) -> Self {
    Self {
      middlewares: Arc::clone(&self.middlewares),
    }
  }
}

/// A fixed middleware list whose dependency bundle is chosen per call. See [`flow`].
pub struct Flow<D, V, E> {
  middlewares: Arc<[SharedMiddleware<D, V, E>]>,
}

/// Captures `middlewares` once. Bind it to a bundle with
/// [`Flow::with_deps`], then run the bound flow on as many values as needed.
pub fn flow<D, V, E>(middlewares: Vec<SharedMiddleware<D, V, E>>) -> Flow<D, V, E> {
  Flow {
    middlewares: middlewares.into(),
  }
}

impl<D, V, E> Flow<D, V, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  pub fn with_deps(&self, deps: D) -> BoundFlow<D, V, E> {
    self.with_shared_deps(Arc::new(deps))
  }

  pub fn with_shared_deps(&self, deps: Arc<D>) -> BoundFlow<D, V, E> {
    BoundFlow {
      pipe: Pipe::from_shared(deps).named("flow"),
      middlewares: Arc::clone(&self.middlewares),
    }
  }

  pub fn len(&self) -> usize {
    self.middlewares.len()
  }

  pub fn is_empty(&self) -> bool {
    self.middlewares.is_empty()
  }
}

impl<D, V, E> Clone for Flow<D, V, E> {
  fn clone(&self) -> Self {
    Self {
      middlewares: Arc::clone(&self.middlewares),
    }
  }
}

/// A [`Flow`] bound to one dependency bundle.
pub struct BoundFlow<D, V, E>
where
  D: Send + Sync + 'static,
{
  pipe: Pipe<D>,
  middlewares: Arc<[SharedMiddleware<D, V, E>]>,
}

impl<D, V, E> BoundFlow<D, V, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  pub async fn run(&self, initial: V) -> Result<V, E> {
    self.pipe.run(initial, &self.middlewares).await
  }

  pub async fn run_detailed(&self, initial: V) -> Result<RunReport<V>, E> {
    self.pipe.run_detailed(initial, &self.middlewares).await
  }

  pub fn deps(&self) -> &Arc<D> {
    self.pipe.deps()
  }
}

/// Awaits several runs concurrently and resolves with their values in the
/// order given, or with the first error.
///
/// On the first error the runs still pending are dropped, which cancels
/// them mid-step. Runs that must finish regardless should be spawned by the
/// caller and their handles merged instead.
///
/// This is a plain utility over run futures, not a middleware.
pub async fn merge<V, E, I, F>(runs: I) -> Result<Vec<V>, E>
where
  I: IntoIterator<Item = F>,
  F: Future<Output = Result<V, E>>,
{
  try_join_all(runs).await
}
