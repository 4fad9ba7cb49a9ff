//! Command-line interface layer.
//!
//! Commands load a [`CollectContext`](crate::core::context::CollectContext),
//! print their report to stdout and return an [`ExitStatus`].

use anyhow::Result;

pub mod args;
pub mod commands;
mod exit_status;
pub mod report;
mod run;

pub use args::{Arguments, Command};
pub use exit_status::ExitStatus;

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}
