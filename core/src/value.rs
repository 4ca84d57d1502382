// pipewright/src/value.rs

//! Hooks for combinators that have to manufacture a value rather than pass
//! one through: [`ask`](crate::ask) past the end of the history, and
//! [`concurrency`](crate::concurrency) folding its branch outcomes.

use crate::core::control::Branch;
use serde_json::{Map, Value};

/// Key of the JSON object that stands in for a stopped branch when a
/// `serde_json::Value` pipe gathers a fan-out.
pub const STOPPED_KEY: &str = "$stopped";

/// A value with an explicit "nothing here" marker.
pub trait Absent {
  fn absent() -> Self;
}

impl<T> Absent for Option<T> {
  fn absent() -> Self {
    None
  }
}

impl Absent for Value {
  fn absent() -> Self {
    Value::Null
  }
}

/// Folds the ordered outcomes of a fan-out back into a single value.
pub trait Gather: Sized {
  fn gather(branches: Vec<Branch<Self>>) -> Self;
}

impl Gather for Value {
  /// Produces an array in branch order. A stopped branch becomes
  /// `{"$stopped": <message or null>}`.
  fn gather(branches: Vec<Branch<Self>>) -> Self {
    Value::Array(
      branches
        .into_iter()
        .map(|branch| match branch {
          Branch::Completed(value) => value,
          Branch::Stopped(signal) => {
            let mut marker = Map::new();
            marker.insert(
              STOPPED_KEY.to_string(),
              signal.message().map_or(Value::Null, |m| Value::String(m.to_string())),
            );
            Value::Object(marker)
          }
        })
        .collect(),
    )
  }
}

impl<T> Gather for Vec<T>
where
  T: Absent + From<Vec<T>>,
{
  /// One entry per branch, in branch order: a completed branch's items are
  /// folded into a single `T`, a stopped branch becomes `T::absent()`.
  ///
  /// `Vec<serde_json::Value>` qualifies (each branch becomes an array). For
  /// other element types, pass a fold to
  /// [`concurrency_with`](crate::concurrency_with).
  fn gather(branches: Vec<Branch<Self>>) -> Self {
    branches
      .into_iter()
      .map(|branch| match branch {
        Branch::Completed(items) => T::from(items),
        Branch::Stopped(_) => T::absent(),
      })
      .collect()
  }
}

/// Returns true if `value` is the marker [`Gather for Value`](Gather) emits
/// for a stopped branch.
pub fn is_stopped_marker(value: &Value) -> bool {
  value.as_object().is_some_and(|object| object.len() == 1 && object.contains_key(STOPPED_KEY))
}
