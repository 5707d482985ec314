//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gesture Pipeline - Recognize hand gestures from skeleton streams
///
/// Without a subcommand, reads sensor ticks (JSON lines) and dispatches an
/// input action per recognized gesture. With a SEQUENCE_FILE, classifies
/// every window of that feature-row file and prints the class distribution.
#[derive(Parser, Debug)]
#[command(name = "gesture-pipeline")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Feature-row file to classify in batch
    #[arg(value_name = "SEQUENCE_FILE")]
    pub sequence_file: Option<PathBuf>,

    /// Sensor tick stream for the live loop (stdin when omitted)
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Train every gesture model from the dataset directory
    Train {
        /// Retrain even when all models load
        #[arg(short, long)]
        force: bool,
    },

    /// Print the confusion matrix over the per-gesture training files
    Confusion,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or reset configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a specific configuration value
    Get {
        /// Dotted key (e.g., "sequence.window_size")
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// What the binary was asked to do
#[derive(Debug, PartialEq)]
pub enum Mode<'a> {
    Live { source: Option<&'a PathBuf> },
    Batch { sequence_file: &'a PathBuf },
    Command(&'a Commands),
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn mode(&self) -> Mode<'_> {
        match (&self.command, &self.sequence_file) {
            (Some(command), _) => Mode::Command(command),
            (None, Some(sequence_file)) => Mode::Batch { sequence_file },
            (None, None) => Mode::Live {
                source: self.source.as_ref(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_no_arguments_is_live_from_stdin() {
        let cli = Cli::try_parse_from(["gesture-pipeline"]).unwrap();
        assert_eq!(cli.mode(), Mode::Live { source: None });
    }

    #[test]
    fn test_live_with_source() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "--source", "ticks.jsonl"]).unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Live {
                source: Some(&PathBuf::from("ticks.jsonl"))
            }
        );
    }

    #[test]
    fn test_positional_is_batch() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "Dataset/testData.txt"]).unwrap();
        assert_eq!(
            cli.mode(),
            Mode::Batch {
                sequence_file: &PathBuf::from("Dataset/testData.txt")
            }
        );
    }

    #[test]
    fn test_cli_parse_train() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "train"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Train { force: false })));

        let cli = Cli::try_parse_from(["gesture-pipeline", "train", "--force"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Train { force: true })));
    }

    #[test]
    fn test_cli_parse_confusion() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "confusion"]).unwrap();
        assert!(matches!(cli.mode(), Mode::Command(Commands::Confusion)));
    }

    #[test]
    fn test_cli_parse_init_command() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "init", "-f"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
    }

    #[test]
    fn test_cli_parse_config_actions() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Show
            })
        ));

        let cli = Cli::try_parse_from(["gesture-pipeline", "config", "get", "sequence.window_size"]).unwrap();
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Get { key },
            }) => assert_eq!(key, "sequence.window_size"),
            other => panic!("Expected config get, got {:?}", other),
        }

        let cli = Cli::try_parse_from(["gesture-pipeline", "config", "reset"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Reset { force: false }
            })
        ));
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["gesture-pipeline", "train", "-v", "--config", "/tmp/g.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/g.toml")));
    }

    #[test]
    fn test_positional_conflicts_with_subcommand() {
        assert!(Cli::try_parse_from(["gesture-pipeline", "rows.txt", "train"]).is_err());
    }

    #[test]
    fn test_cli_unknown_flag_fails() {
        assert!(Cli::try_parse_from(["gesture-pipeline", "--nonexistent"]).is_err());
    }

    #[test]
    fn test_cli_verify_command_structure() {
        Cli::command().debug_assert();
    }
}
