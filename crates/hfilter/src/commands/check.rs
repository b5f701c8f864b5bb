//! Check command implementation.
//!
//! Parses a filter and reports whether it is valid.

use owo_colors::OwoColorize;

use super::{parse_filter, CommandContext, Result};

/// Executes the check command.
///
/// Invalid filters surface as [`super::CommandError::Filter`].
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let node = parse_filter(filter)?;

    if ctx.json_output {
        let output = serde_json::json!({
            "valid": true,
            "filter": node.to_filter_text(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        if ctx.use_colors {
            println!("{} {}", "ok".green().bold(), node);
        } else {
            println!("ok {}", node);
        }
    }

    Ok(())
}
