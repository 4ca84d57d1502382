// pipewright/src/pipeline/definition.rs

//! Contains the `Pipe<D>` struct: a dependency bundle plus the settings a run
//! is executed with. The run loop itself lives in `execution.rs`.

use std::borrow::Cow;
use std::sync::Arc;

const DEFAULT_PIPE_NAME: &str = "pipe";

/// A runner bound to one dependency bundle `D`.
///
/// The same `Pipe` can execute any number of runs, over any middleware lists
/// whose dependency type is `D`. Every step of every run receives a clone of
/// the same `Arc<D>`.
pub struct Pipe<D>
where
  D: Send + Sync + 'static,
{
  pub(crate) deps: Arc<D>,
  pub(crate) name: Cow<'static, str>,
}

impl<D> Pipe<D>
where
  D: Send + Sync + 'static,
{
  pub fn new(deps: D) -> Self {
    Self::from_shared(Arc::new(deps))
  }

  /// Uses an already shared bundle; runs will hand out clones of this exact `Arc`.
  pub fn from_shared(deps: Arc<D>) -> Self {
    Self {
      deps,
      name: Cow::Borrowed(DEFAULT_PIPE_NAME),
    }
  }

  /// Sets the name recorded on this pipe's tracing spans.
  pub fn named(mut self, name: impl Into<Cow<'static, str>>) -> Self {
    self.name = name.into();
    self
  }

  pub fn deps(&self) -> &Arc<D> {
    &self.deps
  }

  pub fn name(&self) -> &str {
    &self.name
  }
}

impl<D> Clone for Pipe<D>
where
  D: Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      deps: Arc::clone(&self.deps),
      name: self.name.clone(),
    }
  }
}

impl<D> std::fmt::Debug for Pipe<D>
where
  D: Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipe")
      .field("name", &self.name)
      .field("deps_type", &std::any::type_name::<D>())
      .finish()
  }
}

/// Shorthand for [`Pipe::new`].
pub fn pipe<D>(deps: D) -> Pipe<D>
where
  D: Send + Sync + 'static,
{
  Pipe::new(deps)
}
