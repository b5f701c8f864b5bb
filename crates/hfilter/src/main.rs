use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::load_config;
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Installs the logger. `RUST_LOG` overrides the level picked from the flags.
fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let mut ctx = CommandContext::from_cli(cli);

    // Commands that must work without a readable config file
    match &cli.command {
        Commands::Completions { shell } => return Ok(commands::completions::execute(shell)?),
        Commands::Config { command } => {
            return match command {
                Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
                Some(ConfigCommands::Init { force }) => {
                    commands::config::execute_init(&ctx, *force)
                }
                Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
            };
        }
        _ => {}
    }

    let config = load_config(ctx.config_path.as_deref())?;
    ctx.apply_output_config(&config.output);

    match &cli.command {
        Commands::Check { filter } => commands::check::execute(&ctx, filter),
        Commands::Fmt { filter } => commands::fmt::execute(&ctx, filter),
        Commands::Ast { filter } => commands::ast::execute(&ctx, filter),
        Commands::V3 { filter } => commands::v3::execute(&ctx, &config.namespace()?, filter),
        Commands::Implied { filter } => {
            commands::implied::execute(&ctx, &config.namespace()?, filter)
        }
        Commands::Completions { .. } | Commands::Config { .. } => Ok(()),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Config(_) => 5,
        CommandError::Filter(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haystack_filter_rs::filter::FilterError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CommandError::Filter(FilterError::EmptyExpression)),
            "FILTER_ERROR"
        );
        assert_eq!(error_code(&CommandError::Config("x".to_string())), "CONFIG_ERROR");
        assert_eq!(
            error_code(&CommandError::Io(std::io::Error::other("x"))),
            "IO_ERROR"
        );
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(exit_status(&CommandError::Config("x".to_string())), 5);
        assert_eq!(
            exit_status(&CommandError::Filter(FilterError::UnclosedParenthesis)),
            1
        );
        assert_eq!(exit_status(&CommandError::Io(std::io::Error::other("x"))), 3);
    }
}
