//! Implied command implementation.
//!
//! Expands type tests into the tags that imply them, using the defs from the
//! config file.

use haystack_filter_rs::filter::generate_implied;
use haystack_model_rs::DefNamespace;

use super::{parse_filter, print_warnings, unknown_def_warnings, CommandContext, Result};

/// Executes the implied command.
pub fn execute(ctx: &CommandContext, namespace: &DefNamespace, filter: &str) -> Result<()> {
    let node = parse_filter(filter)?;
    let warnings = unknown_def_warnings(&node, namespace);
    let expanded = generate_implied(&node, namespace);

    if ctx.json_output {
        let output = serde_json::json!({
            "filter": expanded,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_warnings(ctx, &warnings);
        println!("{}", expanded);
    }

    Ok(())
}
