// pipewright/src/pipeline/mod.rs

//! Defines the `Pipe<D>` runner, its execution loop, and the ways a whole
//! middleware list can be reused.

pub mod definition;
pub mod execution;
pub mod flow;

pub use definition::{pipe, Pipe};
pub use flow::{flow, merge, sub_pipe, BoundFlow, Flow, SubPipe};
