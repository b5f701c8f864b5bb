//! Command implementations for the hfilter CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod ast;
pub mod check;
pub mod completions;
pub mod config;
pub mod fmt;
pub mod implied;
pub mod v3;

use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use haystack_filter_rs::filter::ast::{
    Cmp, Conjunction, Disjunction, Has, Missing, Parens, RelationshipTest, TypeTest,
    WildcardEquals,
};
use haystack_filter_rs::filter::{self, FilterError, Node, NodeVisitor};
use haystack_model_rs::{DefNamespace, Namespace};
use owo_colors::OwoColorize;

use crate::cli::Cli;
use config::OutputConfig;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter parsing error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Config file given on the command line or through `HFILTER_CONFIG`.
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            json_output: cli.json,
            use_colors: !cli.no_color && env::var_os("NO_COLOR").is_none(),
            quiet: cli.quiet,
            config_path: cli.config.clone(),
        }
    }

    /// Applies output preferences from the config file.
    ///
    /// Flags given on the command line always win.
    pub fn apply_output_config(&mut self, output: &OutputConfig) {
        if output.json == Some(true) {
            self.json_output = true;
        }
        if output.color == Some(false) {
            self.use_colors = false;
        }
    }
}

/// Parses filter text given on the command line.
pub(crate) fn parse_filter(text: &str) -> Result<Node> {
    Ok(filter::parse(text)?)
}

/// Styles `text` as a heading when colors are enabled.
pub(crate) fn heading(ctx: &CommandContext, text: &str) -> String {
    if ctx.use_colors {
        text.green().bold().to_string()
    } else {
        text.to_string()
    }
}

// ==================== Unknown def hints ====================

/// Returns a warning for each def named in `node` that the namespace does not
/// know, with a suggestion when a close name exists.
pub(crate) fn unknown_def_warnings(node: &Node, namespace: &DefNamespace) -> Vec<String> {
    let mut names = DefNames::default();
    node.accept(&mut names);

    names
        .0
        .into_iter()
        .filter(|name| namespace.by_name(name).is_none())
        .map(|name| match namespace.suggest(&name) {
            Some(suggestion) => format!("unknown def '{name}' (did you mean '{suggestion}'?)"),
            None => format!("unknown def '{name}'"),
        })
        .collect()
}

/// Prints warnings to stderr unless quiet.
pub(crate) fn print_warnings(ctx: &CommandContext, warnings: &[String]) {
    if ctx.quiet {
        return;
    }
    for warning in warnings {
        if ctx.use_colors {
            eprintln!("{} {warning}", "warning:".yellow().bold());
        } else {
            eprintln!("warning: {warning}");
        }
    }
}

/// Collects the def names referenced by type and relationship tests.
#[derive(Default)]
struct DefNames(BTreeSet<String>);

impl NodeVisitor for DefNames {
    type Output = ();

    fn visit_or(&mut self, node: &Disjunction) {
        node.children().iter().for_each(|child| child.accept(self));
    }

    fn visit_and(&mut self, node: &Conjunction) {
        node.children().iter().for_each(|child| child.accept(self));
    }

    fn visit_parens(&mut self, node: &Parens) {
        node.inner().accept(self);
    }

    fn visit_has(&mut self, _: &Has) {}

    fn visit_missing(&mut self, _: &Missing) {}

    fn visit_cmp(&mut self, _: &Cmp) {}

    fn visit_type_test(&mut self, node: &TypeTest) {
        self.0.insert(node.symbol().name().to_string());
    }

    fn visit_relationship(&mut self, node: &RelationshipTest) {
        self.0.insert(node.name().to_string());
        if let Some(term) = node.term() {
            self.0.insert(term.name().to_string());
        }
    }

    fn visit_wildcard_eq(&mut self, _: &WildcardEquals) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use haystack_model_rs::{dict, Symbol};

    fn namespace() -> DefNamespace {
        let def = |name: &str| dict! { "def" => Symbol::new(name) };
        DefNamespace::from_defs(vec![def("equip"), def("ahu"), def("inputs"), def("elec")])
            .unwrap()
    }

    #[test]
    fn test_known_defs_have_no_warnings() {
        let node = parse_filter("^ahu and inputs? ^elec").unwrap();
        assert!(unknown_def_warnings(&node, &namespace()).is_empty());
    }

    #[test]
    fn test_unknown_def_with_suggestion() {
        let node = parse_filter("^ahuu or site").unwrap();
        assert_eq!(
            unknown_def_warnings(&node, &namespace()),
            vec!["unknown def 'ahuu' (did you mean 'ahu'?)".to_string()]
        );
    }

    #[test]
    fn test_unknown_def_without_suggestion() {
        let node = parse_filter("(outputs? ^water)").unwrap();
        assert_eq!(
            unknown_def_warnings(&node, &namespace()),
            vec![
                "unknown def 'outputs'".to_string(),
                "unknown def 'water'".to_string(),
            ]
        );
    }

    #[test]
    fn test_tag_tests_are_not_defs() {
        let node = parse_filter("foo and bar == 1 and equipRef *== @x").unwrap();
        assert!(unknown_def_warnings(&node, &namespace()).is_empty());
    }

    #[test]
    fn test_parse_filter_error() {
        assert!(matches!(
            parse_filter("site and"),
            Err(CommandError::Filter(FilterError::UnexpectedEndOfInput))
        ));
    }
}
