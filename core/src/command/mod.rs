//! Commands, fetchers and the machinery that matches events to them.
//!
//! A [`Table`] is an ordered list of [`Entry`] descriptors. Each entry
//! declares its parameters with the [`Arg`] builder; [`bind`] turns the
//! event's tokens into [`Args`], and [`dispatch_command`] /
//! [`dispatch_fetcher`] pick the entry to run.

mod arg;
mod binder;
#[allow(clippy::module_inception)]
mod command;
mod dispatch;

pub use arg::{Arg, Getter};
pub use binder::bind;
pub use command::{
    Action, Args, Command, CommandHandler, CommandTable, Entry, Fetcher, FetcherHandler,
    FetcherTable, Table,
};
pub use dispatch::{dispatch_command, dispatch_fetcher, select};

#[cfg(test)]
mod binder_test;
