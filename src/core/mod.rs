//! Orchestration core.
//!
//! The public API from this module is [`Group`], its [`GroupBuilder`] and
//! [`GroupConfig`], and the [`Signal`] set a group can watch.
//!
//! Internal modules:
//! - `group`: start race, stop phase, run precedence;
//! - `errgroup`: detached per-runner tasks with first-error aggregation;
//! - `shutdown`: cross-platform signal listener (cancellation source);
//! - `config`: shutdown policy and its sentinels;
//! - `builder`: fluent construction and subscriber wiring.

mod builder;
mod config;
mod errgroup;
mod group;
mod shutdown;

pub use builder::GroupBuilder;
pub use config::GroupConfig;
pub use group::Group;
pub use shutdown::Signal;

pub(crate) use errgroup::panic_info;
