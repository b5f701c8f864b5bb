//! Fmt command implementation.

use super::{parse_filter, CommandContext, Result};

/// Prints a filter in canonical form.
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let text = parse_filter(filter)?.to_filter_text();

    if ctx.json_output {
        let output = serde_json::json!({ "filter": text });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", text);
    }

    Ok(())
}
