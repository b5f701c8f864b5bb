//! Ast command implementation.
//!
//! Shows how a filter was parsed, either as an indented tree or, with
//! `--json`, as the debug JSON form of the AST.

use haystack_filter_rs::filter::Node;
use owo_colors::OwoColorize;

use super::{parse_filter, CommandContext, Result};

/// Executes the ast command.
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let node = parse_filter(filter)?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&node.to_debug_json())?);
    } else {
        let mut lines = Vec::new();
        render_tree(ctx, &node, 0, &mut lines);
        println!("{}", lines.join("\n"));
    }

    Ok(())
}

/// Renders one line per node; terminals show their filter text.
fn render_tree(ctx: &CommandContext, node: &Node, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    let kind = node.kind().name();
    let kind = if ctx.use_colors {
        kind.cyan().to_string()
    } else {
        kind.to_string()
    };

    if node.kind().is_composite() {
        lines.push(format!("{indent}{kind}"));
        for child in node.children() {
            render_tree(ctx, child, depth + 1, lines);
        }
    } else {
        lines.push(format!("{indent}{kind} {node}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> CommandContext {
        CommandContext {
            json_output: false,
            use_colors: false,
            quiet: false,
            config_path: None,
        }
    }

    #[test]
    fn test_render_tree() {
        let node = parse_filter("site and (equip or not foo)").unwrap();
        let mut lines = Vec::new();
        render_tree(&plain(), &node, 0, &mut lines);
        assert_eq!(
            lines,
            vec![
                "or",
                "  and",
                "    has site",
                "    parens",
                "      or",
                "        and",
                "          has equip",
                "        and",
                "          missing not foo",
            ]
        );
    }
}
