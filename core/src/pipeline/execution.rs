// pipewright/src/pipeline/execution.rs

//! Contains `Pipe::run()` and `Pipe::run_detailed()`, which thread a value
//! through an ordered list of middlewares.

use crate::core::control::{Control, RunReport, RunStatus};
use crate::core::history::History;
use crate::core::middleware::{PipeValue, SharedMiddleware};
use crate::error::{PipeError, StepError};
use crate::pipeline::definition::Pipe;
use std::sync::Arc;
use tracing::{event, instrument, span, Instrument, Level};

impl<D> Pipe<D>
where
  D: Send + Sync + 'static,
{
  /// Runs `middlewares` in order starting from `initial` and resolves with
  /// the final value.
  ///
  /// A step that returns [`Control::Stop`] ends the run early; the run still
  /// succeeds, with the value that step received. Any `Err` from a step is
  /// returned unchanged and no later step runs.
  pub async fn run<V, E>(&self, initial: V, middlewares: &[SharedMiddleware<D, V, E>]) -> Result<V, E>
  where
    V: PipeValue,
    E: StepError,
  {
    self.run_detailed(initial, middlewares).await.map(RunReport::into_value)
  }

  /// Like [`run`](Self::run), but also reports whether the run was stopped and
  /// the input each step received.
  #[instrument(
    name = "Pipe::run",
    skip_all,
    fields(
      pipe = %self.name,
      value_type = %std::any::type_name::<V>(),
      num_middlewares = middlewares.len(),
    ),
    err(Display)
  )]
  pub async fn run_detailed<V, E>(
    &self,
    initial: V,
    middlewares: &[SharedMiddleware<D, V, E>],
  ) -> Result<RunReport<V>, E>
  where
    V: PipeValue,
    E: StepError,
  {
    event!(Level::DEBUG, "Pipe run starting.");

    let history = History::new();
    let mut current = initial;

    for (step_index, middleware) in middlewares.iter().enumerate() {
      // The history records inputs, so the step sees its own input at the end.
      history.push(current.clone());

      let step = middleware.bind(Arc::clone(&self.deps));
      let step_span = span!(Level::TRACE, "pipe_step", step_index);

      match step.invoke(current, history.clone()).instrument(step_span).await {
        Ok(Control::Continue(next)) => {
          event!(Level::TRACE, step_index, "Step continued.");
          current = next;
        }
        Ok(Control::Stop(signal)) => {
          event!(Level::INFO, step_index, %signal, "Pipe stopped by a step.");
          let value = history.last().ok_or_else(|| {
            E::from(PipeError::Internal(format!(
              "history empty after step {} was invoked",
              step_index
            )))
          })?;
          return Ok(RunReport {
            value,
            status: RunStatus::Stopped(signal),
            history: history.snapshot(),
          });
        }
        Err(e) => {
          event!(Level::ERROR, step_index, error = %e, "Step failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Pipe run completed.");
    Ok(RunReport {
      value: current,
      status: RunStatus::Completed,
      history: history.snapshot(),
    })
  }
}
