//! # Runner abstractions.
//!
//! This module provides the runner-related types:
//! - [`Runner`] - trait for components with an async start and stop
//! - [`RunnerFn`] - adapter turning two optional closures into a runner
//! - [`RunnerRef`] - shared reference to a runner (`Arc<dyn Runner>`)

mod runner;
mod runner_fn;

pub use runner::{Runner, RunnerRef};
pub use runner_fn::RunnerFn;
