// pipewright/src/core/middleware.rs

//! The middleware contract shared by every step and combinator.
//!
//! A middleware has two explicit phases:
//! 1. [`Middleware::bind`] receives the run's dependency bundle and yields a [`Step`].
//! 2. [`Step::invoke`] receives the current value and the run's [`History`] and
//!    yields a future resolving to a [`StepResult`].
//!
//! Every combinator in this crate consumes and produces `Middleware`
//! implementations, so any combinator's output can be handed to the runner or
//! to another combinator.

use crate::core::control::Control;
use crate::core::history::History;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// Values that can be threaded through a pipe.
///
/// `Clone` is needed because the history keeps a copy of every step input.
pub trait PipeValue: Clone + Send + Sync + 'static {}

impl<T> PipeValue for T where T: Clone + Send + Sync + 'static {}

pub type StepResult<V, E> = Result<Control<V>, E>;

pub type StepFuture<V, E> = BoxFuture<'static, StepResult<V, E>>;

/// A middleware that has been bound to a dependency bundle and is ready to
/// run once on a value.
pub struct Step<V, E> {
  call: Box<dyn FnOnce(V, History<V>) -> StepFuture<V, E> + Send>,
}

impl<V: 'static, E: 'static> Step<V, E> {
  pub fn new<F, Fut>(f: F) -> Self
  where
    F: FnOnce(V, History<V>) -> Fut + Send + 'static,
    Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  {
    Self {
      call: Box::new(move |value, history| -> StepFuture<V, E> { Box::pin(f(value, history)) }),
    }
  }

  pub fn invoke(self, value: V, history: History<V>) -> StepFuture<V, E> {
    (self.call)(value, history)
  }
}

impl<V, E> std::fmt::Debug for Step<V, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Step").finish_non_exhaustive()
  }
}

/// A pipeline step: binds to the dependency bundle `D`, then runs on a `V`,
/// failing with `E`.
pub trait Middleware<D, V, E>: Send + Sync + 'static {
  fn bind(&self, deps: Arc<D>) -> Step<V, E>;
}

/// Type-erased middleware, the element type of every ordered middleware list.
pub type SharedMiddleware<D, V, E> = Arc<dyn Middleware<D, V, E>>;

impl<D, V, E, M> Middleware<D, V, E> for Arc<M>
where
  M: Middleware<D, V, E> + ?Sized,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    (**self).bind(deps)
  }
}

pub trait MiddlewareExt<D, V, E>: Middleware<D, V, E> + Sized {
  /// Erases the concrete type so the middleware can sit in a list with others.
  fn shared(self) -> SharedMiddleware<D, V, E> {
    Arc::new(self)
  }
}

impl<D, V, E, M> MiddlewareExt<D, V, E> for M where M: Middleware<D, V, E> {}

/// Builds a `Vec<SharedMiddleware<..>>` from a list of middlewares of any
/// concrete types.
///
/// ```ignore
/// let steps = middlewares![add(1), when(is_even, double), ask(0)];
/// ```
#[macro_export]
macro_rules! middlewares {
  () => {
    ::std::vec::Vec::new()
  };
  ($($mw:expr),+ $(,)?) => {
    ::std::vec![$($crate::MiddlewareExt::shared($mw)),+]
  };
}

// --- Closure-based middlewares ---

/// Middleware built from a `deps -> (value, history) -> future` closure pair.
/// See [`from_fn`].
#[derive(Clone)]
pub struct FromFn<F> {
  f: F,
}

/// Creates a middleware from a closure that binds dependencies and returns the
/// step closure.
///
/// ```ignore
/// let scale = from_fn(|deps: Arc<Deps>| move |value: i64, _history: History<i64>| async move {
///   Ok(Control::Continue(value * deps.factor))
/// });
/// ```
pub fn from_fn<D, V, E, F, S, Fut>(f: F) -> FromFn<F>
where
  F: Fn(Arc<D>) -> S + Send + Sync + 'static,
  S: FnOnce(V, History<V>) -> Fut + Send + 'static,
  Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  V: 'static,
  E: 'static,
{
  FromFn { f }
}

impl<D, V, E, F, S, Fut> Middleware<D, V, E> for FromFn<F>
where
  F: Fn(Arc<D>) -> S + Send + Sync + 'static,
  S: FnOnce(V, History<V>) -> Fut + Send + 'static,
  Fut: Future<Output = StepResult<V, E>> + Send + 'static,
  V: 'static,
  E: 'static,
{
  fn bind(&self, deps: Arc<D>) -> Step<V, E> {
    Step::new((self.f)(deps))
  }
}

/// A value transform lifted into the middleware contract. See [`as_middleware`].
pub struct AsMiddleware<F> {
  f: Arc<F>,
}

/// Lifts an async, fallible `value -> value` function that needs no
/// dependencies into a middleware. The step always continues on `Ok`.
pub fn as_middleware<V, E, F, Fut>(f: F) -> AsMiddleware<F>
where
  F: Fn(V) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<V, E>> + Send + 'static,
{
  AsMiddleware { f: Arc::new(f) }
}

impl<D, V, E, F, Fut> Middleware<D, V, E> for AsMiddleware<F>
where
  F: Fn(V) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<V, E>> + Send + 'static,
  V: 'static,
  E: 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let f = Arc::clone(&self.f);
    Step::new(move |value, _history| {
      let fut = f(value);
      async move { fut.await.map(Control::Continue) }
    })
  }
}

/// Synchronous, infallible value transform. See [`transform`].
pub struct Transform<F> {
  f: Arc<F>,
}

pub fn transform<V, F>(f: F) -> Transform<F>
where
  F: Fn(V) -> V + Send + Sync + 'static,
{
  Transform { f: Arc::new(f) }
}

impl<D, V, E, F> Middleware<D, V, E> for Transform<F>
where
  F: Fn(V) -> V + Send + Sync + 'static,
  V: Send + 'static,
  E: Send + 'static,
{
  fn bind(&self, _deps: Arc<D>) -> Step<V, E> {
    let f = Arc::clone(&self.f);
    Step::new(move |value, _history| {
      let next = f(value);
      std::future::ready(Ok(Control::Continue(next)))
    })
  }
}
