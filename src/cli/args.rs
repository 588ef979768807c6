//! Command-line argument parsing for ollamactl
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ollamactl - manage and query Ollama servers from the terminal
#[derive(Parser, Debug)]
#[command(name = "ollamactl")]
#[command(version)]
#[command(about = "Command-line client for local and remote Ollama servers", long_about = None)]
pub struct Args {
    /// Configuration file path (replaces the global and local files)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Import Ollama hosts from an MCP client config (Cursor, Claude Desktop)
    #[arg(long, global = true)]
    pub mcphost_config: bool,

    /// Host alias, host:port, or hostname
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// Port, overriding the resolved host's port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Verbosity level: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// List installed models
    ListModels {
        /// Print the raw model list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate a completion for a prompt
    Run {
        /// Model to use (defaults to settings.default_model)
        #[arg(short, long)]
        model: Option<String>,

        /// Prompt text
        #[arg(value_name = "PROMPT")]
        prompt: String,

        /// System prompt
        #[arg(long)]
        system: Option<String>,

        /// Wait for the full response instead of streaming
        #[arg(long)]
        no_stream: bool,
    },

    /// Download a model from the registry
    Pull {
        model: String,

        /// Allow insecure registry connections
        #[arg(long)]
        insecure: bool,
    },

    /// Upload a model to the registry
    Push {
        model: String,

        /// Allow insecure registry connections
        #[arg(long)]
        insecure: bool,
    },

    /// Delete an installed model
    Delete {
        model: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show model details
    Show { model: String },

    /// Interactive chat session
    Chat {
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt for the conversation
        #[arg(long)]
        system: Option<String>,
    },

    /// Print the embedding vector for a text
    Embed {
        #[arg(short, long)]
        model: Option<String>,

        #[arg(value_name = "TEXT")]
        text: String,
    },

    /// Write an example configuration file
    InitConfig {
        /// Output path (defaults to the global config path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether the server is reachable
    Health,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Log level directive for this verbosity
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["ollamactl", "health"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["ollamactl", "-v", "health"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["ollamactl", "-vv", "health"]).verbosity(), Verbosity::VeryVerbose);
        assert_eq!(parse(&["ollamactl", "-q", "-v", "health"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_filter_directives() {
        assert_eq!(Verbosity::Quiet.filter_directive(), "error");
        assert_eq!(Verbosity::Normal.filter_directive(), "warn");
        assert_eq!(Verbosity::Verbose.filter_directive(), "debug");
        assert_eq!(Verbosity::VeryVerbose.filter_directive(), "trace");
        assert!(!Verbosity::Quiet.show_progress());
        assert!(Verbosity::Normal.show_progress());
    }

    #[test]
    fn test_global_connection_flags() {
        let args = parse(&["ollamactl", "list-models", "-H", "gpu", "-p", "8080", "--json"]);
        assert_eq!(args.host.as_deref(), Some("gpu"));
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.command, Commands::ListModels { json: true });
    }

    #[test]
    fn test_run_command() {
        let args = parse(&["ollamactl", "run", "-m", "llama2", "Why is the sky blue?", "--no-stream"]);
        assert_eq!(
            args.command,
            Commands::Run {
                model: Some("llama2".to_string()),
                prompt: "Why is the sky blue?".to_string(),
                system: None,
                no_stream: true,
            }
        );
    }

    #[test]
    fn test_delete_requires_model() {
        assert!(Args::try_parse_from(["ollamactl", "delete"]).is_err());
        let args = parse(&["ollamactl", "delete", "llama2", "-y"]);
        assert_eq!(
            args.command,
            Commands::Delete {
                model: "llama2".to_string(),
                yes: true,
            }
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["ollamactl"]).is_err());
    }
}
