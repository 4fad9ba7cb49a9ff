//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `collect`: Aggregate tag translations into locale files
//! - `check`: Report invalid tags and conflicts without writing
//! - `regenerate-tags`: Rewrite tag configs from file locations
//! - `init`: Initialize the langtag configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Collect(cmd)) => cmd.common.verbose,
            Some(Command::Check(cmd)) => cmd.common.verbose,
            Some(Command::RegenerateTags(cmd)) => cmd.common.verbose,
            Some(Command::Init(cmd)) => cmd.common.verbose,
            None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root directory (config lookup and relative paths)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct CollectCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Remove previously generated locale files before writing
    #[arg(long)]
    pub clean: bool,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct RegenerateCommand {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually rewrite source files (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct InitCommand {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect tag translations into locale JSON files
    Collect(CollectCommand),
    /// Report invalid tags and translation conflicts
    Check(CheckCommand),
    /// Rewrite tag namespace/path configs based on file locations
    RegenerateTags(RegenerateCommand),
    /// Initialize a new .langtagrc.json configuration file
    Init(InitCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collect_with_flags() {
        let args =
            Arguments::try_parse_from(["langtag", "collect", "--clean", "-v", "--source-root", "web"])
                .unwrap();
        match args.command {
            Some(Command::Collect(cmd)) => {
                assert!(cmd.clean);
                assert!(cmd.common.verbose);
                assert_eq!(cmd.common.source_root, Some(PathBuf::from("web")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_regenerate_is_dry_run_by_default() {
        let args = Arguments::try_parse_from(["langtag", "regenerate-tags"]).unwrap();
        assert!(matches!(args.command, Some(Command::RegenerateTags(ref cmd)) if !cmd.apply));
        assert!(!args.verbose());
    }

    #[test]
    fn test_verify_cli() {
        Arguments::command().debug_assert();
    }
}
