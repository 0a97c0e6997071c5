use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    forget_command, init_command, list_command, pin_command, pins_command, run_command,
    show_command, test_command, test_path_command, unpin_command, validate_command,
    vars_command,
};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "cmdhub")]
#[command(version, about, long_about = None, propagate_version = true)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging\n    CMDHUB_CONFIG     Use this config file instead of searching for one")]
pub struct Cli {
    /// Config file (defaults to the nearest .cmdhub.json, cmdhub.json or .cmdhub.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Do not read or write remembered values and pins
    #[arg(long, global = true)]
    pub no_state: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter config in the current directory
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// List every command, pinned ones first
    #[command(visible_alias = "ls")]
    List,
    /// List shared variables and option lists
    Vars,
    /// Show a command with its variables filled in where possible
    Show {
        /// Command id
        id: String,
    },
    /// Resolve and run one or more commands in order
    #[command(visible_alias = "r")]
    Run {
        /// Command ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Print the final commands without executing them
        #[arg(short, long)]
        dry_run: bool,

        /// File used for ${file} and the other file built-ins
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Pin a command to the top of the list
    Pin {
        id: String,
    },
    /// Remove a pin
    Unpin {
        id: String,
    },
    /// List pinned commands
    Pins,
    /// Forget one remembered value, or all of them
    Forget {
        key: Option<String>,
    },
    /// Check the config for problems
    Validate,
    /// Print the batch selector a test runner would receive
    TestPath {
        /// Test runner id
        #[arg(long)]
        runner: String,

        /// Test file
        #[arg(long, conflicts_with = "folder", required_unless_present = "folder")]
        file: Option<PathBuf>,

        /// Folder of test files
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Test group within --file (e.g. a TestCase class)
        #[arg(long, requires = "file", conflicts_with = "folder")]
        case: Option<String>,
    },
    /// Run tests from a file with a configured test runner
    #[command(visible_alias = "t")]
    Test {
        /// Test runner id
        runner: String,

        /// Test file with optional line number (e.g., tests/test_api.py:42)
        #[arg(long)]
        file: String,

        /// Test name (e.g., TestApi.test_get); defaults to the test at the line, else the whole file
        #[arg(long)]
        name: Option<String>,

        /// Print the command without executing it
        #[arg(short, long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        let open = || Session::open(self.config.as_deref(), self.no_state);

        match self.command {
            Commands::Init { force } => init_command(self.config.as_deref(), force),
            Commands::List => list_command(&open()?),
            Commands::Vars => vars_command(&open()?),
            Commands::Show { ref id } => show_command(&open()?, id),
            Commands::Run {
                ref ids,
                dry_run,
                ref file,
            } => run_command(&mut open()?, ids, dry_run, file.as_deref()),
            Commands::Pin { ref id } => pin_command(&mut open()?, id),
            Commands::Unpin { ref id } => unpin_command(&mut open()?, id),
            Commands::Pins => pins_command(&open()?),
            Commands::Forget { ref key } => forget_command(&mut open()?, key.as_deref()),
            Commands::Validate => validate_command(&open()?),
            Commands::TestPath {
                ref runner,
                ref file,
                ref folder,
                ref case,
            } => test_path_command(
                &open()?,
                runner,
                file.as_deref(),
                folder.as_deref(),
                case.as_deref(),
            ),
            Commands::Test {
                ref runner,
                ref file,
                ref name,
                dry_run,
            } => test_command(&open()?, runner, file, name.as_deref(), dry_run),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["cmdhub", "run", "a", "b", "--dry-run", "--no-state"]);
        assert!(cli.no_state);
        match cli.command {
            Commands::Run { ids, dry_run, .. } => {
                assert_eq!(ids, vec!["a", "b"]);
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_test_path_needs_file_or_folder() {
        assert!(Cli::try_parse_from(["cmdhub", "test-path", "--runner", "py"]).is_err());
        assert!(
            Cli::try_parse_from([
                "cmdhub", "test-path", "--runner", "py", "--file", "a.py", "--folder", "t"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["cmdhub", "test-path", "--runner", "py", "--folder", "t", "--case", "C"])
                .is_err()
        );
    }
}
