// pipewright/src/concurrency.rs

//! Concurrent fan-out: run several middlewares against the same value and
//! collect every outcome.
//!
//! All branches are bound and started, in list order, before any of them is
//! awaited. They are then polled together on the caller's task until every
//! branch has settled; nothing is spawned. Each branch sees the same value and
//! the same history snapshot.
//!
//! Settlement rules:
//!  - If any branch failed, the first failure *in settlement order* is
//!    returned and later failures are dropped.
//!  - Otherwise the outcomes come back in branch order (not completion
//!    order). A branch that raised a stop signal contributes
//!    [`Branch::Stopped`] instead of ending the fan-out.

use crate::core::control::{Branch, Control};
use crate::core::history::History;
use crate::core::middleware::{Middleware, PipeValue, SharedMiddleware, Step};
use crate::error::{PipeError, StepError};
use crate::value::Gather;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tracing::{event, Level};

type GatherFn<V> = Arc<dyn Fn(Vec<Branch<V>>) -> V + Send + Sync>;

/// See [`concurrency`] and [`concurrency_with`].
pub struct Concurrency<D, V, E> {
  branches: Arc<[SharedMiddleware<D, V, E>]>,
  gather: GatherFn<V>,
}

/// Fans the current value out to `branches` and folds the ordered outcomes
/// with [`Gather::gather`].
pub fn concurrency<D, V, E>(branches: Vec<SharedMiddleware<D, V, E>>) -> Concurrency<D, V, E>
where
  V: Gather + 'static,
{
  concurrency_with(branches, V::gather)
}

/// Fans the current value out to `branches` and folds the ordered outcomes
/// with `gather`.
pub fn concurrency_with<D, V, E, G>(branches: Vec<SharedMiddleware<D, V, E>>, gather: G) -> Concurrency<D, V, E>
where
  G: Fn(Vec<Branch<V>>) -> V + Send + Sync + 'static,
{
  Concurrency {
    branches: branches.into(),
    gather: Arc::new(gather),
  }
}

impl<D, V, E> Concurrency<D, V, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  /// Runs every branch and returns the raw ordered outcomes, without folding.
  pub async fn settle(&self, deps: Arc<D>, value: V, history: History<V>) -> Result<Vec<Branch<V>>, E> {
    settle_branches(&self.branches, deps, value, history).await
  }

  pub fn len(&self) -> usize {
    self.branches.len()
  }

  pub fn is_empty(&self) -> bool {
    self.branches.is_empty()
  }
}

impl<D, V, E> Middleware<D, V, E> for Concurrency<D, V, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    let branches = Arc::clone(&self.branches);
    let gather = Arc::clone(&self.gather);
    Step::new(move |value, history| async move {
      let outcomes = settle_branches(&branches, deps, value, history).await?;
      Ok::<_, E>(Control::Continue(gather(outcomes)))
    })
  }
}

impl<D, V, E> Clone for Concurrency<D, V, E> {
  fn clone(&self) -> Self {
    Self {
      branches: Arc::clone(&self.branches),
      gather: Arc::clone(&self.gather),
    }
  }
}

async fn settle_branches<D, V, E>(
  branches: &[SharedMiddleware<D, V, E>],
  deps: Arc<D>,
  value: V,
  history: History<V>,
) -> Result<Vec<Branch<V>>, E>
where
  D: Send + Sync + 'static,
  V: PipeValue,
  E: StepError,
{
  event!(Level::DEBUG, num_branches = branches.len(), "Fan-out starting.");

  let mut pending: FuturesUnordered<_> = branches
    .iter()
    .enumerate()
    .map(|(branch_index, branch)| {
      let step = branch.bind(Arc::clone(&deps));
      let fut = step.invoke(value.clone(), history.clone());
      async move { (branch_index, fut.await) }
    })
    .collect();

  let mut outcomes: Vec<Option<Branch<V>>> = (0..branches.len()).map(|_| None).collect();
  let mut first_failure: Option<E> = None;

  while let Some((branch_index, result)) = pending.next().await {
    match result {
      Ok(Control::Continue(output)) => {
        outcomes[branch_index] = Some(Branch::Completed(output));
      }
      Ok(Control::Stop(signal)) => {
        event!(Level::DEBUG, branch_index, %signal, "Branch stopped; recording sentinel.");
        outcomes[branch_index] = Some(Branch::Stopped(signal));
      }
      Err(e) => {
        if first_failure.is_none() {
          event!(Level::WARN, branch_index, error = %e, "Branch failed; fan-out will fail once all branches settle.");
          first_failure = Some(e);
        } else {
          event!(Level::DEBUG, branch_index, error = %e, "Additional branch failure discarded.");
        }
      }
    }
  }

  if let Some(e) = first_failure {
    return Err(e);
  }

  outcomes
    .into_iter()
    .enumerate()
    .map(|(branch_index, outcome)| {
      outcome.ok_or_else(|| {
        E::from(PipeError::Internal(format!(
          "fan-out branch {} never settled",
          branch_index
        )))
      })
    })
    .collect()
}
