//! V3 command implementation.
//!
//! Lowers a filter to the v3 dialect using the defs from the config file.

use haystack_filter_rs::filter::generate_v3;
use haystack_model_rs::DefNamespace;

use super::{parse_filter, print_warnings, unknown_def_warnings, CommandContext, Result};

/// Executes the v3 command.
pub fn execute(ctx: &CommandContext, namespace: &DefNamespace, filter: &str) -> Result<()> {
    let node = parse_filter(filter)?;
    let warnings = unknown_def_warnings(&node, namespace);
    let lowered = generate_v3(&node, namespace);

    if ctx.json_output {
        let output = serde_json::json!({
            "filter": lowered.filter,
            "requery": lowered.requery,
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_warnings(ctx, &warnings);
        println!("{}", lowered.filter);
        if lowered.requery && !ctx.quiet {
            eprintln!("note: v3 results must be filtered again with the original filter");
        }
    }

    Ok(())
}
