// pipewright/src/core/history.rs
use parking_lot::RwLock;
use std::sync::Arc;

/// Append-only record of the value each step of one run received as input.
///
/// Handles are cheap to clone and all point at the same record. Only the
/// runner appends; steps and combinators read. Locks are taken and released
/// inside each method, so no guard ever crosses an `.await`.
#[derive(Debug)]
pub struct History<V>(Arc<RwLock<Vec<V>>>);

impl<V> History<V> {
  pub fn new() -> Self {
    History(Arc::new(RwLock::new(Vec::new())))
  }

  pub(crate) fn push(&self, value: V) {
    self.0.write().push(value);
  }

  pub fn len(&self) -> usize {
    self.0.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.read().is_empty()
  }
}

impl<V: Clone> History<V> {
  /// The input of the `index`-th step, if that step has started.
  pub fn get(&self, index: usize) -> Option<V> {
    self.0.read().get(index).cloned()
  }

  /// The input of the step currently running (or the last one that ran).
  pub fn last(&self) -> Option<V> {
    self.0.read().last().cloned()
  }

  pub fn snapshot(&self) -> Vec<V> {
    self.0.read().clone()
  }
}

impl<V> Clone for History<V> {
  fn clone(&self) -> Self {
    History(Arc::clone(&self.0))
  }
}

impl<V> Default for History<V> {
  fn default() -> Self {
    Self::new()
  }
}
