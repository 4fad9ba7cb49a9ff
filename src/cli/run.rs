use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{check::check, collect::collect, init::init, regenerate::regenerate_tags},
    exit_status::ExitStatus,
};

/// Dispatch to the handler of the parsed command.
pub fn run(Arguments { command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Collect(cmd)) => collect(cmd),
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::RegenerateTags(cmd)) => regenerate_tags(cmd),
        Some(Command::Init(cmd)) => init(&cmd.common),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
