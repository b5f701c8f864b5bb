//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for hfilter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// hfilter - check, format and rewrite Haystack filters
#[derive(Parser, Debug)]
#[command(name = "hfilter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "HFILTER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that a filter parses
    Check {
        /// Filter expression (e.g., "site and area > 1000ft²")
        filter: String,
    },

    /// Print a filter in canonical form
    Fmt {
        /// Filter expression
        filter: String,
    },

    /// Print the parsed tree as JSON
    Ast {
        /// Filter expression
        filter: String,
    },

    /// Lower a filter to the v3 dialect using the configured defs
    V3 {
        /// Filter expression
        filter: String,
    },

    /// Expand type tests into their implied tags using the configured defs
    Implied {
        /// Filter expression
        filter: String,
    },

    /// View and initialize configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["hfilter", "--verbose", "check", "site"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert!(!cli.json);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["hfilter", "fmt", "site", "--json", "--no-color"]);
        assert!(cli.json);
        assert!(cli.no_color);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["hfilter", "-q", "-v", "check", "site"]).is_err());
    }

    #[test]
    fn test_filter_argument() {
        let cli = Cli::parse_from(["hfilter", "v3", "^ahu and not foo"]);
        if let Commands::V3 { filter } = cli.command {
            assert_eq!(filter, "^ahu and not foo");
        } else {
            panic!("Expected V3 command");
        }
    }

    #[test]
    fn test_config_path_flag() {
        let cli = Cli::parse_from(["hfilter", "--config", "/tmp/defs.toml", "implied", "^ahu"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/defs.toml")));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["hfilter", "config", "init", "--force"]);
        if let Commands::Config {
            command: Some(ConfigCommands::Init { force }),
        } = cli.command
        {
            assert!(force);
        } else {
            panic!("Expected Config Init command");
        }
    }

    #[test]
    fn test_completions() {
        let cli = Cli::parse_from(["hfilter", "completions", "zsh"]);
        if let Commands::Completions { shell } = cli.command {
            assert!(matches!(shell, Shell::Zsh));
        } else {
            panic!("Expected Completions command");
        }
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["hfilter"]).is_err());
    }
}
