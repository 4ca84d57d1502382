// pipewright/src/lookup.rs

//! Retrospective lookups into the run history.

use crate::core::control::Control;
use crate::core::middleware::{Middleware, PipeValue, Step};
use crate::value::Absent;
use std::sync::Arc;
use tracing::{event, Level};

/// See [`ask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ask {
  index: usize,
}

/// A middleware that ignores its input and continues with the input of the
/// `index`-th step of the current run, or `V::absent()` if that step has not
/// run. It never fails.
pub fn ask(index: usize) -> Ask {
  Ask { index }
}

impl Ask {
  pub fn index(&self) -> usize {
    self.index
  }
}

impl<D, V, E> Middleware<D, V, E> for Ask
where
  D: Send + Sync + 'static,
  V: PipeValue + Absent,
  E: Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let index = self.index;
    Step::new(move |_value, history| {
      let found = history.get(index).unwrap_or_else(|| {
        event!(Level::TRACE, index, history_len = history.len(), "ask index out of range.");
        V::absent()
      });
      std::future::ready(Ok(Control::Continue(found)))
    })
  }
}
