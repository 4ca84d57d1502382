pub mod control;
pub mod handler;
pub mod history;
pub mod middleware;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{Branch, Control, RunReport, RunStatus, StopSignal};
pub use handler::{handler, Handler, HandlerMiddleware};
pub use history::History;
pub use middleware::{
  as_middleware, from_fn, transform, Middleware, MiddlewareExt, PipeValue, SharedMiddleware, Step, StepFuture,
  StepResult,
};
