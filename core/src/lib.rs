// src/lib.rs

//! pipewright: composable asynchronous middleware pipelines.
//!
//! A pipe threads one value through an ordered list of middlewares. Every
//! middleware first binds to a shared dependency bundle, then runs on the
//! current value and the run's history of step inputs. On top of that runner
//! the crate provides combinators that are themselves middlewares:
//!  - `when` / `if_else` for conditional execution and branching.
//!  - `loop_while` / `do_while` for pre- and post-test loops.
//!  - `try_catch` for intercepting failures and stop signals.
//!  - `concurrency` for fanning a value out to several middlewares at once.
//!  - `ask` for reading an earlier step's input back out of the history.
//!  - `sub_pipe` and `flow` for reusing a whole middleware list.
//!
//! Any step may return [`Control::Stop`] to end the run early. A stopped run
//! is not a failure: it resolves with the value the stopping step received.

pub mod common;
pub mod concurrency;
pub mod conditional;
pub mod core;
pub mod error;
pub mod lookup;
pub mod pipeline;
pub mod value;

// --- Re-exports for the Public API ---

pub use crate::core::control::{Branch, Control, RunReport, RunStatus, StopSignal};
pub use crate::core::handler::{handler, Handler, HandlerMiddleware};
pub use crate::core::history::History;
pub use crate::core::middleware::{
  as_middleware, from_fn, transform, Middleware, MiddlewareExt, PipeValue, SharedMiddleware, Step, StepFuture,
  StepResult,
};

pub use crate::pipeline::{flow, merge, pipe, sub_pipe, BoundFlow, Flow, Pipe, SubPipe};

pub use crate::conditional::{
  catch_fn, do_while, if_else, loop_while, try_catch, when, Catch, CatchStep, Raised,
};
pub use crate::concurrency::{concurrency, concurrency_with, Concurrency};
pub use crate::lookup::{ask, Ask};
pub use crate::value::{Absent, Gather};

pub use crate::common::{log_value, push_data, stop, tap, throw_error};

pub use crate::error::{PipeError, PipeResult, StepError};

/*
    Typical use:
    1. Define a dependency bundle `Deps` (clients, settings, ...).
    2. Write middlewares with `from_fn`, `as_middleware`, `transform`, or a
       type implementing `Handler`.
    3. Collect them with `middlewares![..]`, wrapping any of them in
       combinators as needed.
    4. `pipe(deps).run(initial, &steps).await`.
*/
