// pipewright/src/conditional/mod.rs

//! Control-flow combinators: conditional execution, branching, loops and
//! exception interception. Each takes middlewares and returns a middleware.

pub mod branch;
pub mod looping;
pub mod recovery;

pub use branch::{if_else, when, IfElse, When};
pub use looping::{do_while, loop_while, DoWhile, LoopWhile};
pub use recovery::{catch_fn, try_catch, Catch, CatchFn, CatchStep, Raised, TryCatch};
